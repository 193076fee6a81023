//! Main application UI.
//! Upload a CSV, optionally save it as a deck, then study it one card at a time.

use chrono::Local;
use eframe::egui;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use studybuddy::context::AppContext;
use studybuddy::database::{DeckStore, DeckSubscription};
use studybuddy::export::{export_json_to_path, import_json};
use studybuddy::notify::NotificationLevel;
use studybuddy::upload::{self, UploadError};
use studybuddy::{Deck, DeckSet, StudySession, UserProfile};

const EXAMPLE_CSV: &str = "question,answer
What is the capital of France?,Paris
Which planet is known as the Red Planet?,Mars";

/// Space also activates a focused button, so it only flips the card when
/// nothing has keyboard focus.
fn space_flips_card(space_pressed: bool, widget_focused: bool) -> bool {
    space_pressed && !widget_focused
}

/// A parsed upload waiting for the user to study or save it
struct PendingDeck {
    deck: Deck,
    file_name: String,
}

/// Main application state
pub struct StudyApp {
    context: AppContext,
    session: StudySession,

    user: Option<UserProfile>,
    sign_in_name: String,
    subscription: Option<DeckSubscription>,
    saved_decks: DeckSet,

    pending: Option<PendingDeck>,
    deck_name: String,
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.context.notifications.expire(self.context.notification_ttl());
        self.refresh_decks();

        self.render_header(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.is_active() {
                self.render_study_screen(ui);
            } else {
                self.render_upload_screen(ui);
            }
        });

        if self.session.is_active() {
            self.handle_study_keys(ctx);
        }

        self.render_notifications(ctx);
    }
}

impl StudyApp {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            session: StudySession::new(),
            user: None,
            sign_in_name: String::new(),
            subscription: None,
            saved_decks: DeckSet::default(),
            pending: None,
            deck_name: String::new(),
        }
    }

    /// Picks up store changes for the signed-in owner
    fn refresh_decks(&mut self) {
        let Some(subscription) = &mut self.subscription else {
            return;
        };
        match subscription.poll(&self.context.store) {
            Some(Ok(decks)) => self.saved_decks = decks,
            // access denied is already on screen via the store's reporter
            Some(Err(e)) if !e.is_access_denied() => {
                self.context
                    .notifications
                    .error("Could not load decks", e.to_string());
            }
            _ => {}
        }
    }

    /// Title bar with sign-in controls and the "New Deck" reset
    fn render_header(&mut self, ctx: &egui::Context) {
        let mut action_sign_in = false;
        let mut action_sign_out = false;
        let mut action_new_deck = false;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("StudyBuddy");

                if self.session.is_active() && ui.button("New Deck").clicked() {
                    action_new_deck = true;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(user) = &self.user {
                        if ui.button("Sign out").clicked() {
                            action_sign_out = true;
                        }
                        ui.label(format!("Signed in as {}", user.display_name));
                    } else {
                        if ui.button("Sign in").clicked() {
                            action_sign_in = true;
                        }
                        ui.add(
                            egui::TextEdit::singleline(&mut self.sign_in_name)
                                .hint_text("Your name")
                                .desired_width(140.0),
                        );
                    }
                });
            });
        });

        // Execute deferred actions
        if action_sign_in {
            self.sign_in();
        }
        if action_sign_out {
            self.sign_out();
        }
        if action_new_deck {
            self.session.clear();
            self.pending = None;
        }
    }

    /// Renders the upload screen with the parsed-file preview and saved decks
    fn render_upload_screen(&mut self, ui: &mut egui::Ui) {
        ui.heading("Upload Your Study Deck");
        ui.label("Select a CSV file with 'question' and 'answer' columns to begin.");
        ui.add_space(10.0);

        let mut action_pick_csv = false;
        let mut action_pick_json = false;
        let mut action_study_now = false;
        let mut action_save = false;
        let mut action_discard = false;

        ui.horizontal(|ui| {
            if ui.button("Choose CSV file…").clicked() {
                action_pick_csv = true;
            }
            if ui.button("Import JSON deck…").clicked() {
                action_pick_json = true;
            }
        });

        if let Some(pending) = &self.pending {
            ui.add_space(10.0);
            ui.group(|ui| {
                ui.label(format!(
                    "Loaded {} cards from {}",
                    pending.deck.cards.len(),
                    pending.file_name
                ));
                ui.horizontal(|ui| {
                    ui.label("Deck name:");
                    ui.text_edit_singleline(&mut self.deck_name);
                });
                ui.horizontal(|ui| {
                    if ui.button("Study now").clicked() {
                        action_study_now = true;
                    }
                    let can_save = self.user.is_some();
                    if ui
                        .add_enabled(can_save, egui::Button::new("Save & study"))
                        .on_disabled_hover_text("Sign in to save decks")
                        .clicked()
                    {
                        action_save = true;
                    }
                    if ui.button("Discard").clicked() {
                        action_discard = true;
                    }
                });
            });
        }

        ui.add_space(10.0);
        ui.label("Example CSV format:");
        ui.code(EXAMPLE_CSV);

        ui.separator();
        let (action_study, action_export) = self.render_saved_decks(ui);

        // Execute deferred actions
        if action_pick_csv {
            self.pick_csv();
        }
        if action_pick_json {
            self.pick_json();
        }
        if action_study_now {
            self.study_pending();
        }
        if action_save {
            self.save_pending();
        }
        if action_discard {
            self.pending = None;
        }
        if let Some(id) = action_study {
            if let Some(stored) = self.saved_decks.find(&id) {
                self.session.select_deck(Arc::clone(&stored.deck));
            }
        }
        if let Some(id) = action_export {
            self.handle_export(&id);
        }
    }

    /// Lists the signed-in owner's decks. Returns the ids of the deck to study
    /// and the deck to export, if one was clicked.
    fn render_saved_decks(&self, ui: &mut egui::Ui) -> (Option<String>, Option<String>) {
        let mut action_study = None;
        let mut action_export = None;

        if self.user.is_none() {
            ui.label("Sign in to save decks and find them here later.");
            return (None, None);
        }

        ui.heading(format!("Your Decks ({})", self.saved_decks.len()));
        if self.saved_decks.is_empty() {
            ui.label("No saved decks yet.");
            return (None, None);
        }

        egui::ScrollArea::vertical()
            .id_source("saved_decks")
            .max_height(260.0)
            .show(ui, |ui| {
                for (i, stored) in self.saved_decks.decks.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "{}. {} ({} cards, {})",
                            i + 1,
                            stored.name(),
                            stored.cards().len(),
                            stored.created_at.with_timezone(&Local).format("%Y-%m-%d")
                        ));
                        if ui.button("Study").clicked() {
                            action_study = Some(stored.id.clone());
                        }
                        if ui.button("Export").clicked() {
                            action_export = Some(stored.id.clone());
                        }
                    });
                }
            });

        (action_study, action_export)
    }

    /// Renders the study screen: one card, reveal toggle, previous/next
    fn render_study_screen(&mut self, ui: &mut egui::Ui) {
        let Some(deck) = self.session.active_deck().cloned() else {
            return;
        };
        let Some(card) = self.session.current_card().cloned() else {
            return;
        };
        let revealed = self.session.is_revealed();

        ui.heading(deck.name.as_str());
        ui.label(self.session.position_message());
        ui.add_space(20.0);

        let card_response = ui
            .group(|ui| {
                ui.set_min_height(220.0);
                ui.set_min_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.label(egui::RichText::new("QUESTION").small().weak());
                    ui.label(egui::RichText::new(card.question.as_str()).heading().strong());
                    ui.add_space(20.0);

                    if revealed {
                        ui.label(egui::RichText::new("ANSWER").small().weak());
                        ui.label(egui::RichText::new(card.answer.as_str()).heading());
                    } else {
                        ui.label("(Click the card or press Space to reveal the answer)");
                    }
                    ui.add_space(20.0);
                });
            })
            .response
            .interact(egui::Sense::click());

        ui.add_space(20.0);

        // Store actions to execute after UI rendering
        let mut action_toggle = card_response.clicked();
        let mut action_previous = false;
        let mut action_next = false;

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.session.is_first(), egui::Button::new("◀ Previous"))
                .clicked()
            {
                action_previous = true;
            }
            let toggle_label = if revealed { "Hide answer" } else { "Show answer" };
            if ui.button(toggle_label).clicked() {
                action_toggle = true;
            }
            if ui
                .add_enabled(!self.session.is_last(), egui::Button::new("Next ▶"))
                .clicked()
            {
                action_next = true;
            }
        });

        // Execute deferred actions
        if action_toggle {
            self.session.toggle_answer();
        }
        if action_previous {
            self.session.previous_card();
        }
        if action_next {
            self.session.next_card();
        }
    }

    /// ←/→ move between cards, Space flips the current one
    fn handle_study_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let widget_focused = ctx.memory(|m| m.focused().is_some());
        let (left, right, space) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Space),
            )
        });
        if left {
            self.session.previous_card();
        }
        if right {
            self.session.next_card();
        }
        if space_flips_card(space, widget_focused) {
            self.session.toggle_answer();
        }
    }

    /// Shows queued notifications stacked in the bottom-right corner
    fn render_notifications(&mut self, ctx: &egui::Context) {
        let notifications = self.context.notifications.snapshot();
        let mut dismissed: Option<u64> = None;

        for (i, notification) in notifications.iter().enumerate() {
            egui::Window::new(notification.title.as_str())
                .id(egui::Id::new(("notification", notification.id)))
                .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0 - i as f32 * 96.0])
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.set_max_width(320.0);
                    match notification.level {
                        NotificationLevel::Error => {
                            let color = ui.visuals().error_fg_color;
                            ui.colored_label(color, notification.message.as_str());
                        }
                        NotificationLevel::Info => {
                            ui.label(notification.message.as_str());
                        }
                    }
                    if ui.button("Dismiss").clicked() {
                        dismissed = Some(notification.id);
                    }
                });
        }

        if let Some(id) = dismissed {
            self.context.notifications.dismiss(id);
        }
        if notifications
            .iter()
            .any(|n| n.level == NotificationLevel::Info)
        {
            // keep repainting so info notifications expire on their own
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }

    fn sign_in(&mut self) {
        match self.context.sign_in(&self.sign_in_name) {
            Ok(profile) => {
                self.subscription = Some(DeckSubscription::new(&profile.uid));
                self.saved_decks = DeckSet::default();
                self.sign_in_name.clear();
                self.user = Some(profile);
            }
            Err(e) => {
                self.context.notifications.error("Sign-in failed", e.to_string());
            }
        }
    }

    fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!("Signed out '{}'", user.display_name);
        }
        self.subscription = None;
        self.saved_decks = DeckSet::default();
    }

    /// Handles CSV selection and parsing
    fn pick_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .pick_file()
        else {
            return;
        };

        match upload::read_deck_file(&path) {
            Ok(deck) => self.set_pending(deck, &path),
            Err(e) => {
                let title = match e {
                    UploadError::Read { .. } => "File Error",
                    UploadError::Parse(_) => "Upload Error",
                };
                self.pending = None;
                self.context.notifications.error(title, e.to_string());
            }
        }
    }

    /// Handles deck import from a JSON file
    fn pick_json(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        match import_json(&path) {
            Ok(deck) => self.set_pending(deck, &path),
            Err(e) => {
                self.pending = None;
                self.context
                    .notifications
                    .error("Import failed", e.to_string());
            }
        }
    }

    fn set_pending(&mut self, deck: Deck, path: &Path) {
        self.deck_name = deck.name.clone();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.pending = Some(PendingDeck { deck, file_name });
    }

    /// Studies the pending upload without saving it
    fn study_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            let deck = Deck::new(&self.deck_name, pending.deck.cards);
            self.session.select_deck(Arc::new(deck));
        }
    }

    /// Saves the pending upload for the signed-in owner, then studies it
    fn save_pending(&mut self) {
        let Some(user) = &self.user else {
            self.context
                .notifications
                .error("Not signed in", "Sign in to save decks.");
            return;
        };
        let Some(pending) = &self.pending else {
            return;
        };

        match self
            .context
            .store
            .add_deck(&user.uid, &self.deck_name, pending.deck.cards.clone())
        {
            Ok(stored) => {
                self.context.notifications.info(
                    "Deck saved",
                    format!("'{}' saved with {} cards.", stored.name(), stored.cards().len()),
                );
                self.session.select_deck(Arc::clone(&stored.deck));
                self.pending = None;
            }
            // access denied is already on screen via the store's reporter
            Err(e) if e.is_access_denied() => {}
            Err(e) => {
                self.context
                    .notifications
                    .error("Could not save deck", e.to_string());
            }
        }
    }

    /// Handles deck export to a JSON file
    fn handle_export(&mut self, deck_id: &str) {
        let Some(stored) = self.saved_decks.find(deck_id) else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.json", stored.name()))
            .add_filter("JSON files", &["json"])
            .save_file()
        else {
            return;
        };

        match export_json_to_path(&stored.deck, &path) {
            Ok(()) => {
                self.context
                    .notifications
                    .info("Export", format!("Deck '{}' exported successfully!", stored.name()));
            }
            Err(e) => {
                self.context
                    .notifications
                    .error("Export failed", e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_flips_card_without_focus() {
        assert!(space_flips_card(true, false));
        assert!(!space_flips_card(false, false));
    }

    #[test]
    fn test_space_on_focused_button_does_not_flip_again() {
        let mut session = StudySession::new();
        session.select_deck(Arc::new(
            upload::deck_from_text("Capitals", EXAMPLE_CSV).unwrap(),
        ));

        // the focused "Show answer" button already handled this press
        session.toggle_answer();
        if space_flips_card(true, true) {
            session.toggle_answer();
        }
        assert!(session.is_revealed());
    }
}
