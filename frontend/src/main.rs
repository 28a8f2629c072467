mod api;
mod components;

use api::ApiClient;
use components::file_list::render_file_list;
use components::handlers;
use components::header::render_header;
use components::results::render_result;
use components::submit_section::{render_prompt_input, render_submit_button};
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Interval;
use shared::{Batch, FileConstraint, FileId, FileRecord, SubmissionState, Tickers};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FileUploadProps {
    #[prop_or_default]
    pub constraint: FileConstraint,
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or_default]
    pub on_files_change: Option<Callback<Vec<GlooFile>>>,
}

// Yew msg components
pub enum Msg {
    // File operations
    FilesAdded(Vec<GlooFile>),
    RemoveFile(usize),
    ClearAllFiles,
    ProgressTick(FileId),

    // Submission
    SetPrompt(String),
    Submit,
    Generated(Result<String, String>),
    DismissResult,

    // UI states
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

/// Batch upload widget: admits files, simulates per-file progress and
/// submits the first file with the prompt.
pub struct FileUpload {
    pub(crate) batch: Batch<GlooFile>,
    pub(crate) tickers: Tickers<Interval>,
    pub(crate) submission: SubmissionState,
    pub(crate) error: Option<String>,
    pub(crate) is_dragging: bool,
    pub(crate) file_input: NodeRef,
    pub(crate) api: ApiClient,
    paste_listener: Option<EventListener>,
}

fn files_listener(
    callback: Option<Callback<Vec<GlooFile>>>,
) -> impl FnMut(&[FileRecord<GlooFile>]) + 'static {
    move |records| {
        if let Some(callback) = &callback {
            callback.emit(records.iter().map(|r| r.payload.clone()).collect());
        }
    }
}

impl Component for FileUpload {
    type Message = Msg;
    type Properties = FileUploadProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            batch: Batch::with_listener(files_listener(ctx.props().on_files_change.clone())),
            tickers: Tickers::new(),
            submission: SubmissionState::default(),
            error: None,
            is_dragging: false,
            file_input: NodeRef::default(),
            api: ApiClient::default(),
            paste_listener: None,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        } else {
            log::warn!("No global window, paste support disabled");
        }

        model
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().on_files_change != old_props.on_files_change {
            self.batch
                .set_listener(files_listener(ctx.props().on_files_change.clone()));
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // File operations
            Msg::FilesAdded(files) => handlers::handle_files_added(self, ctx, files),
            Msg::RemoveFile(index) => handlers::handle_remove_file(self, index),
            Msg::ClearAllFiles => handlers::handle_clear_all_files(self),
            Msg::ProgressTick(id) => handlers::handle_progress_tick(self, id),

            // Submission
            Msg::SetPrompt(prompt) => {
                self.submission.set_prompt(prompt);
                true
            }
            Msg::Submit => handlers::handle_submit(self, ctx),
            Msg::Generated(outcome) => handlers::handle_generated(self, outcome),
            Msg::DismissResult => {
                self.submission.dismiss();
                true
            }

            // UI states
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if self.submission.result().is_some() {
            return render_result(self, ctx);
        }

        html! {
            <div class="file-upload">
                { render_prompt_input(self, ctx) }
                <div class="upload-card">
                    { render_upload_section(self, ctx) }
                    { render_error_message(self) }
                    { render_file_list(self, ctx) }
                </div>
                { render_submit_button(self, ctx) }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.tickers.cancel_all();
    }
}

#[function_component(App)]
fn app() -> Html {
    let on_files_change = use_callback((), |files: Vec<GlooFile>, _| {
        log::debug!("Batch now holds {} file(s)", files.len());
    });

    html! {
        <div class="container">
            { render_header() }

            <main class="main-content">
                <FileUpload
                    constraint={FileConstraint::documents()}
                    on_files_change={Some(on_files_change)}
                />
            </main>

            <footer class="app-footer">
                <p>{"Prompted File Upload | Fullstack Rust WASM"}</p>
            </footer>
        </div>
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
