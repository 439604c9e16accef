use crate::app::model::PersistStamp;
use crate::app::{App, Message, Model, ToastLevel, update};
use crate::cache::{DraftCache, Hydration, save_auto_load};
use crate::preview::{self, Renderer};
use crate::store::Store;

/// Everything the side-effect handler writes to: the store, the preview
/// renderer and the draft cache.
pub(super) struct Session<S: Store, R: Renderer> {
    pub(super) store: S,
    pub(super) renderer: R,
    pub(super) cache: DraftCache,
    persisted: PersistStamp,
}

impl<S: Store, R: Renderer> Session<S, R> {
    pub(super) fn new(store: S, renderer: R, cache: DraftCache) -> Self {
        Self {
            store,
            renderer,
            cache,
            persisted: PersistStamp::default(),
        }
    }

    /// Hydrate `model` from the store. The model's current content counts as
    /// already persisted afterwards.
    pub(super) fn mount(&mut self, model: &mut Model) {
        if model.auto_load {
            match self.cache.load(&self.store) {
                Hydration::Restored(snapshot) => {
                    tracing::info!(key = self.cache.key(), "restored cached draft");
                    model.hydrate(snapshot);
                }
                Hydration::UseDefaults => {
                    tracing::debug!(key = self.cache.key(), "no usable draft; using defaults");
                }
            }
        }
        model.has_submission = preview::last_submission(&self.store).is_some();
        self.persisted = model.persist_stamp();
    }

    /// Write the pending draft if its quiet period is over.
    pub(super) fn poll(&mut self, model: &mut Model, now_ms: u64) -> bool {
        if self.cache.poll(&mut self.store, now_ms) {
            model.document.mark_clean();
            return true;
        }
        false
    }

    /// Restart the quiet period if the document or name changed.
    fn track_changes(&mut self, model: &Model, now_ms: u64) {
        let stamp = model.persist_stamp();
        if stamp != self.persisted {
            self.cache
                .schedule(model.document.text(), model.author_name.clone(), now_ms);
            self.persisted = stamp;
        }
    }

    fn save_now(&mut self, model: &mut Model) -> bool {
        let saved = self.cache.save_now(
            &mut self.store,
            &model.document.text(),
            &model.author_name,
        );
        if saved {
            model.document.mark_clean();
        }
        self.persisted = model.persist_stamp();
        saved
    }
}

impl App {
    /// Apply one message: pure update, then side effects.
    pub(super) fn dispatch<S: Store, R: Renderer>(
        model: &mut Model,
        session: &mut Session<S, R>,
        msg: Message,
        now_ms: u64,
    ) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, session, &side_msg, now_ms);
    }

    pub(super) fn handle_message_side_effects<S: Store, R: Renderer>(
        model: &mut Model,
        session: &mut Session<S, R>,
        msg: &Message,
        now_ms: u64,
    ) {
        match msg {
            // Store and renderer failures are logged where they happen and
            // never surface as a toast.
            Message::Save => {
                if session.save_now(model) {
                    model.show_toast(ToastLevel::Info, "Draft saved");
                }
            }
            Message::Submit => {
                let text = model.document.text();
                let outcome = preview::submit(&mut session.store, &mut session.renderer, &text);
                model.has_submission = outcome.stored;
                if outcome.stored {
                    model.show_toast(ToastLevel::Info, "Submitted");
                }
            }
            Message::Reset if !model.reset_confirmed => {
                preview::clear_submission(&mut session.store);
                session.save_now(model);
                model.show_toast(ToastLevel::Info, "Reset to the starter page");
            }
            Message::ToggleAutoLoad => {
                save_auto_load(&mut session.store, model.auto_load);
                let state = if model.auto_load { "on" } else { "off" };
                model.show_toast(ToastLevel::Info, format!("Auto-load {state}"));
            }
            Message::Quit => {
                session.track_changes(model, now_ms);
                if session.cache.flush(&mut session.store) {
                    model.document.mark_clean();
                }
            }
            _ => {}
        }
        session.track_changes(model, now_ms);
    }
}
