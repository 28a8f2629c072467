use super::utils::debounce;
use crate::{FileUpload, Msg};
use gloo_file::File as GlooFile;
use shared::progress::COMPLETE;
use shared::{FileId, FileRecord, format_bytes};
use yew::prelude::*;

pub fn render_file_list(model: &FileUpload, ctx: &Context<FileUpload>) -> Html {
    let max_files = ctx.props().constraint.max_files;
    let count = model.batch.len();
    let link = ctx.link().clone();

    let items = if model.batch.is_empty() {
        html! {}
    } else {
        html! {
            <div class="file-list">
                <h3>{ format!("Uploaded Files ({}/{})", count, max_files) }</h3>
                {
                    model.batch
                        .files()
                        .enumerate()
                        .map(|(index, (id, file))| render_file_item(model, ctx, index, id, file))
                        .collect::<Html>()
                }
            </div>
        }
    };

    html! {
        <>
            { items }
            <div class="card-footer">
                <span class="file-count">{ format!("{} of {} files", count, max_files) }</span>
                if !model.batch.is_empty() {
                    <button
                        class="analyze-btn secondary"
                        onclick={debounce(300, move || link.send_message(Msg::ClearAllFiles))}
                    >
                        <i class="fa-solid fa-trash"></i>{" Clear All"}
                    </button>
                }
            </div>
        </>
    }
}

fn render_file_item(
    model: &FileUpload,
    ctx: &Context<FileUpload>,
    index: usize,
    id: FileId,
    file: &FileRecord<GlooFile>,
) -> Html {
    let progress = model.batch.progress(id).filter(|p| *p < COMPLETE);

    html! {
        <div class="file-item" key={id.to_string()}>
            <i class="fa-regular fa-file"></i>
            <div class="file-details">
                <div class="file-name" title={file.name.clone()}>{ &file.name }</div>
                <div class="file-size">{ format_bytes(file.size_bytes) }</div>
                if let Some(percent) = progress {
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", percent)}></div>
                    </div>
                }
            </div>
            <button
                class="remove-btn"
                title="Remove file"
                onclick={ctx.link().callback(move |e: MouseEvent| {
                    e.stop_propagation();
                    Msg::RemoveFile(index)
                })}
            >
                <i class="fa-solid fa-times" style="font-size: 10px;"></i>
                <span class="sr-only">{"Remove file"}</span>
            </button>
        </div>
    }
}
