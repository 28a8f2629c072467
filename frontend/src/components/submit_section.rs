use super::utils::debounce;
use crate::{FileUpload, Msg};
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

pub fn render_prompt_input(model: &FileUpload, ctx: &Context<FileUpload>) -> Html {
    let oninput = ctx.link().callback(|e: InputEvent| {
        let textarea: HtmlTextAreaElement = e.target_unchecked_into();
        Msg::SetPrompt(textarea.value())
    });

    html! {
        <textarea
            class="prompt-input"
            placeholder="Enter your prompt here"
            rows="10"
            value={model.submission.prompt().to_string()}
            {oninput}
        />
    }
}

pub fn render_submit_button(model: &FileUpload, ctx: &Context<FileUpload>) -> Html {
    let link = ctx.link().clone();
    let loading = model.submission.is_loading();

    html! {
        <div class="submit-section">
            <button
                class="analyze-btn"
                disabled={loading || ctx.props().disabled}
                onclick={debounce(300, move || link.send_message(Msg::Submit))}
            >
                if loading {
                    <i class="fa-solid fa-spinner fa-spin"></i>
                } else {
                    {"Submit"}
                }
            </button>
            if let Some(error) = model.submission.error() {
                <div class="error-message" role="alert">
                    <i class="fa-solid fa-circle-exclamation"></i>
                    <p>{ error }</p>
                </div>
            }
        </div>
    }
}
