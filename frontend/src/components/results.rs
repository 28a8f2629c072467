use crate::{FileUpload, Msg};
use yew::prelude::*;

/// Generated text with a Close button that returns to the batch view.
pub fn render_result(model: &FileUpload, ctx: &Context<FileUpload>) -> Html {
    let Some(text) = model.submission.result() else {
        return html! {};
    };

    html! {
        <div class="results-container">
            <div class="result-header">
                <h2><i class="fa-solid fa-wand-magic-sparkles"></i>{" Result"}</h2>
            </div>
            <p class="result-text">{ text }</p>
            <div class="button-container">
                <button class="analyze-btn" onclick={ctx.link().callback(|_| Msg::DismissResult)}>
                    {"Close"}
                </button>
            </div>
        </div>
    }
}
