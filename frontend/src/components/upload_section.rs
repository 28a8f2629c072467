use super::utils::extract_files;
use crate::{FileUpload, Msg};
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &FileUpload, ctx: &Context<FileUpload>) -> Html {
    let props = ctx.props();
    let disabled = props.disabled;
    let link = ctx.link();

    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let files = input.files().as_ref().map(extract_files).unwrap_or_default();
        input.set_value("");
        (!files.is_empty()).then_some(Msg::FilesAdded(files))
    });

    let handle_drag_over = link.batch_callback(move |e: DragEvent| {
        e.prevent_default();
        (!disabled).then_some(Msg::SetDragging(true))
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    let trigger_file_input = {
        let file_input = model.file_input.clone();
        Callback::from(move |_: MouseEvent| {
            if disabled {
                return;
            }
            if let Some(input) = file_input.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    html! {
        <div class="upload-section">
            <div class="card-header">
                <h2>{"File Upload"}</h2>
                <p class="subtitle">{"Drag and drop files here or click to select files"}</p>
            </div>

            <input
                type="file"
                ref={model.file_input.clone()}
                multiple=true
                accept={props.constraint.accept_attr()}
                style="display: none;"
                disabled={disabled}
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!(
                    "upload-area",
                    model.is_dragging.then_some("drag-over"),
                    disabled.then_some("disabled")
                )}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={trigger_file_input}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p><strong>{"Click to upload"}</strong>{" or drag and drop"}</p>
                    <p class="file-types">{ props.constraint.describe() }</p>
                </div>
            </div>
        </div>
    }
}
