use yew::prelude::*;

pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-file-arrow-up"></i> {" Upload File"}</h1>
            <p class="subtitle">{"Add a file, write a prompt and submit"}</p>
        </header>
    }
}
