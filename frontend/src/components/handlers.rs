use crate::components::utils::extract_files;
use crate::{FileUpload, Msg};
use gloo_file::File as GlooFile;
use gloo_timers::callback::Interval;
use shared::admission;
use shared::progress::{self, TICK_INTERVAL_MS};
use shared::{FileId, FileRecord, TextGenerator};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

fn to_record(file: GlooFile) -> FileRecord<GlooFile> {
    FileRecord::new(file.name(), file.size(), file.raw_mime_type(), file)
}

pub fn handle_files_added(model: &mut FileUpload, ctx: &Context<FileUpload>, files: Vec<GlooFile>) -> bool {
    if ctx.props().disabled {
        log::debug!("Ignoring {} file(s) while disabled", files.len());
        return false;
    }

    model.error = None;
    let candidates = files.into_iter().map(to_record).collect::<Vec<_>>();

    match admission::admit_drop(candidates, model.batch.len(), &ctx.props().constraint) {
        Ok(admitted) => {
            for id in model.batch.add(admitted) {
                start_ticker(model, ctx, id);
            }
        }
        Err(e) => {
            log::info!("Drop rejected: {}", e);
            model.error = Some(e.to_string());
        }
    }

    true
}

fn start_ticker(model: &mut FileUpload, ctx: &Context<FileUpload>, id: FileId) {
    let link = ctx.link().clone();
    let interval = Interval::new(TICK_INTERVAL_MS, move || {
        link.send_message(Msg::ProgressTick(id));
    });
    model.tickers.start(id, interval);
}

pub fn handle_progress_tick(model: &mut FileUpload, id: FileId) -> bool {
    let tick = model.batch.advance_progress(id, progress::random_step());
    model.tickers.settle(id, tick)
}

pub fn handle_remove_file(model: &mut FileUpload, index: usize) -> bool {
    match model.batch.remove_at(index) {
        Ok((id, file)) => {
            model.tickers.cancel(id);
            log::debug!("Removed {} ({})", file.name, id);
            true
        }
        Err(e) => {
            log::error!("{}", e);
            false
        }
    }
}

pub fn handle_clear_all_files(model: &mut FileUpload) -> bool {
    model.tickers.cancel_all();
    model.batch.clear();
    true
}

pub fn handle_submit(model: &mut FileUpload, ctx: &Context<FileUpload>) -> bool {
    let (prompt, file) = match model.submission.begin(model.batch.first()) {
        Ok((prompt, file)) => (prompt, file.clone()),
        Err(e) => {
            log::warn!("Submit refused: {}", e);
            return true;
        }
    };

    let api = model.api.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = api.generate(&prompt, &file).await.map_err(|e| e.to_string());
        link.send_message(Msg::Generated(outcome));
    });

    true
}

pub fn handle_generated(model: &mut FileUpload, outcome: Result<String, String>) -> bool {
    model.submission.finish(outcome);
    true
}

pub fn handle_drop(model: &mut FileUpload, ctx: &Context<FileUpload>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        ctx.link().send_message(Msg::FilesAdded(extract_files(&file_list)));
    }

    true
}

pub fn handle_paste(model: &mut FileUpload, ctx: &Context<FileUpload>, event: ClipboardEvent) -> bool {
    if model.submission.result().is_some() {
        return false;
    }

    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        if file_list.length() > 0 {
            event.prevent_default();
            ctx.link().send_message(Msg::FilesAdded(extract_files(&file_list)));
            return true;
        }
    }
    false
}
