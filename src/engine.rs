//! Moteur d'événements — possède l'état transitoire et câble les comportements.
//!
//! Tout ce qui était dispersé en variables globales dans une couche de
//! script classique vit ici, dans une seule structure : état du menu,
//! section courante, phase d'envoi du formulaire, génération du message
//! de statut, échéancier. Le document lui-même ([`Page`]) ne porte que
//! ses reflets visibles.
//!
//! ## Flux
//!
//! ```text
//! Event (clic, scroll, touche, visibilité, chargement)
//!     │
//!     ▼
//! Engine::handle ──► machines d'états (menu, scrollspy, form)
//!     │                         │
//!     │                         ▼
//!     │               reflets sur la Page (classes, attributs, styles)
//!     ▼
//! TimerQueue ◄── envoi simulé, fondu des messages, debounce d'annonce
//!     │
//!     ▼
//! Engine::advance(ms) ──► actions échues, rejouées au temps logique exact
//! ```
//!
//! L'horloge est logique : le pilote (binaire ou test) avance le temps
//! explicitement, les échéances chaînées partent à la milliseconde près.

use tracing::{debug, info};

use crate::config::Config;
use crate::form::{self, FormData, SimulatedBackend, SubmissionBackend, SubmitPhase};
use crate::links::{self, AnchorTarget};
use crate::menu::{self, MenuState};
use crate::page::{FocusTarget, MessageKind, Page};
use crate::scrollspy::{self, SectionTracker};
use crate::timers::{TimerAction, TimerId, TimerQueue};

/// Touches interprétées par le moteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
}

/// Champ nommé du formulaire de contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
}

/// Événement d'entrée du moteur.
#[derive(Debug, Clone)]
pub enum Event {
    /// Fin de chargement du document.
    Load,
    /// Activation du bouton toggle du menu mobile.
    ToggleMenu,
    /// Clic sur un lien du menu de navigation.
    ClickNavLink { href: String },
    /// Clic sur une ancre interne hors menu (retour en haut, etc.).
    ClickAnchor { href: String },
    /// Défilement du viewport à la position donnée.
    Scroll { y: f64 },
    KeyDown(Key),
    MouseDown,
    /// Saisie dans un champ du formulaire.
    EditField { field: Field, value: String },
    SetConsent(bool),
    /// Soumission du formulaire de contact.
    SubmitForm,
    /// Une image observée est entrée dans la zone de visibilité.
    ImageVisible { id: String },
}

/// Le moteur. Une instance par document.
pub struct Engine {
    page: Page,
    config: Config,
    menu: MenuState,
    tracker: SectionTracker,
    phase: SubmitPhase,
    backend: Box<dyn SubmissionBackend>,
    timers: TimerQueue,
    /// Échéance d'annonce en attente — la seule réarmée par les scrolls.
    announce_timer: Option<TimerId>,
    /// Données capturées à la soumission, journalisées à la confirmation.
    pending_submission: Option<FormData>,
    /// Génération du message de statut courant (timers périmés ignorés).
    message_generation: u64,
    now_ms: u64,
}

impl Engine {
    /// Moteur avec le backend simulé (latence tirée de la config).
    pub fn new(page: Page, config: Config) -> Self {
        let backend = SimulatedBackend {
            latency_ms: config.form.submit_latency_ms,
        };
        Self::with_backend(page, config, Box::new(backend))
    }

    /// Moteur avec un backend d'envoi fourni par l'appelant.
    pub fn with_backend(page: Page, config: Config, backend: Box<dyn SubmissionBackend>) -> Self {
        Self {
            page,
            config,
            menu: MenuState::new(),
            tracker: SectionTracker::new(),
            phase: SubmitPhase::Idle,
            backend,
            timers: TimerQueue::new(),
            announce_timer: None,
            pending_submission: None,
            message_generation: 0,
            now_ms: 0,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn menu_is_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn current_section(&self) -> Option<&str> {
        self.tracker.current()
    }

    pub fn submit_phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Load => self.on_load(),
            Event::ToggleMenu => {
                // Bouton absent du document : comportement sauté.
                if let Some(nav) = &mut self.page.nav {
                    let open = self.menu.toggle();
                    menu::apply(nav, open);
                    debug!(open, "Menu toggled");
                }
            }
            Event::ClickNavLink { href } => {
                if self.page.viewport.width <= self.config.nav.mobile_breakpoint {
                    self.menu.close();
                    if let Some(nav) = &mut self.page.nav {
                        menu::apply(nav, false);
                    }
                }
                self.follow_anchor(&href);
            }
            Event::ClickAnchor { href } => self.follow_anchor(&href),
            Event::Scroll { y } => {
                self.page.viewport.scroll_y = y;
                self.scroll_pass();
            }
            Event::KeyDown(Key::Escape) => {
                if self.menu.is_open()
                    && let Some(nav) = &mut self.page.nav
                {
                    self.menu.close();
                    menu::apply(nav, false);
                    // Le focus clavier revient au bouton qui a ouvert le menu.
                    self.page.focused = Some(FocusTarget::MenuToggle);
                }
            }
            Event::KeyDown(Key::Tab) => self.page.remove_body_class("using-mouse"),
            Event::MouseDown => self.page.add_body_class("using-mouse"),
            Event::EditField { field, value } => {
                if let Some(contact) = &mut self.page.form {
                    match field {
                        Field::Name => contact.name = value,
                        Field::Email => contact.email = value,
                        Field::Phone => contact.phone = value,
                        Field::Message => contact.message = value,
                    }
                }
            }
            Event::SetConsent(consent) => {
                if let Some(contact) = &mut self.page.form {
                    contact.consent = consent;
                }
            }
            Event::SubmitForm => self.submit_form(),
            Event::ImageVisible { id } => {
                if let Some(img) = self.page.image_mut(&id)
                    && img.observed
                    && let Some(src) = img.data_src.take()
                {
                    img.src = Some(src);
                    img.observed = false;
                    debug!(image = %id, "Lazy image loaded");
                }
            }
        }
    }

    /// Avance l'horloge logique de `ms` millisecondes, en tirant chaque
    /// échéance au temps exact où elle tombe (les timers chaînés — fondu
    /// puis retrait — gardent leurs délais nominaux).
    pub fn advance(&mut self, ms: u64) {
        let target = self.now_ms.saturating_add(ms);
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > target {
                break;
            }
            self.now_ms = deadline;
            for action in self.timers.advance(deadline) {
                self.apply_timer(action);
            }
        }
        self.now_ms = target;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chargement
    // ─────────────────────────────────────────────────────────────────────

    fn on_load(&mut self) {
        self.page.add_body_class("loaded");
        self.page.announce("Page loaded successfully");

        let hardened = links::harden_outbound(&mut self.page.links);

        // Mise sous observation des images différées.
        let mut observed = 0;
        for img in &mut self.page.images {
            if img.data_src.is_some() {
                img.observed = true;
                observed += 1;
            }
        }

        info!(site = %self.config.site.title, "{}", self.config.site.tagline);
        debug!(hardened, observed, "Document wired");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Défilement
    // ─────────────────────────────────────────────────────────────────────

    fn follow_anchor(&mut self, href: &str) {
        match links::resolve_anchor(href, &self.page.sections, self.config.nav.header_offset) {
            AnchorTarget::Top => self.scroll_smooth(0.0),
            AnchorTarget::Offset(top) => self.scroll_smooth(top),
            AnchorTarget::None => {}
        }
    }

    /// Défilement programmatique : repasse par la même passe de scroll
    /// que les défilements utilisateur.
    fn scroll_smooth(&mut self, top: f64) {
        self.page.scroll_to(top);
        self.scroll_pass();
    }

    fn scroll_pass(&mut self) {
        let scroll_y = self.page.viewport.scroll_y;
        scrollspy::update_highlights(
            &self.page.sections,
            &mut self.page.nav_links,
            scroll_y,
            self.config.scroll.highlight_lookback,
        );

        // Debounce : chaque scroll annule l'annonce en attente et réarme.
        if let Some(id) = self.announce_timer.take() {
            self.timers.cancel(id);
        }
        self.announce_timer = Some(self.timers.schedule(
            self.now_ms,
            self.config.scroll.announce_debounce_ms,
            TimerAction::AnnounceSections,
        ));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Formulaire
    // ─────────────────────────────────────────────────────────────────────

    fn submit_form(&mut self) {
        // Bouton désactivé pendant l'envoi ; la machine ne s'y fie pas.
        if self.phase == SubmitPhase::Sending {
            return;
        }
        let Some(contact) = &self.page.form else {
            return;
        };
        let data = FormData::capture(contact);

        if let Err(err) = form::validate(&data) {
            debug!(error = %err, "Form rejected");
            self.show_message(MessageKind::Error, &err.to_string());
            return;
        }

        let latency = self.backend.submit(&data);
        self.pending_submission = Some(data);
        self.phase = SubmitPhase::Sending;
        if let Some(contact) = &mut self.page.form {
            contact.submit.disabled = true;
            contact.submit.label = self.config.form.sending_label.clone();
        }
        self.timers
            .schedule(self.now_ms, latency, TimerAction::FinishSubmit);
    }

    /// Remplace le message de statut et arme son cycle de retrait.
    fn show_message(&mut self, kind: MessageKind, text: &str) {
        self.message_generation += 1;
        let generation = self.message_generation;
        let Some(contact) = &mut self.page.form else {
            return;
        };
        form::show_status(contact, kind, text, generation);
        self.page.scroll_message_into_view();
        self.timers.schedule(
            self.now_ms,
            self.config.form.message_visible_ms,
            TimerAction::BeginMessageFade(generation),
        );
    }

    fn apply_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::FinishSubmit => {
                self.phase = SubmitPhase::Idle;
                let data = self.pending_submission.take();
                let success = self.config.form.success_message.clone();
                self.show_message(MessageKind::Success, &success);
                if let Some(contact) = &mut self.page.form {
                    contact.reset();
                    contact.submit.disabled = false;
                    contact.submit.label = self.config.form.submit_label.clone();
                }
                if let Some(data) = data {
                    info!(
                        name = %data.name,
                        email = %data.email,
                        phone = %data.phone,
                        message = %data.message,
                        "Form submission"
                    );
                }
            }
            TimerAction::BeginMessageFade(generation) => {
                if let Some(contact) = &mut self.page.form
                    && form::begin_fade(contact, generation)
                {
                    self.timers.schedule(
                        self.now_ms,
                        self.config.form.message_fade_ms,
                        TimerAction::RemoveMessage(generation),
                    );
                }
            }
            TimerAction::RemoveMessage(generation) => {
                if let Some(contact) = &mut self.page.form {
                    form::remove_status(contact, generation);
                }
            }
            TimerAction::AnnounceSections => {
                self.announce_timer = None;
                let probe = self.page.viewport.scroll_y + self.config.scroll.announce_offset;
                if let Some(id) = self.tracker.observe(&self.page.sections, probe) {
                    let text = format!("Now viewing: {id} section");
                    info!(section = %id, "Section changed");
                    self.page.announce(&text);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ScrollRequest;

    fn engine() -> Engine {
        Engine::new(Page::demo(), Config::default())
    }

    fn fill_valid_form(engine: &mut Engine) {
        engine.handle(Event::EditField {
            field: Field::Name,
            value: "Ada Lovelace".to_string(),
        });
        engine.handle(Event::EditField {
            field: Field::Email,
            value: "ada@example.org".to_string(),
        });
        engine.handle(Event::EditField {
            field: Field::Message,
            value: "Hello there".to_string(),
        });
        engine.handle(Event::SetConsent(true));
    }

    // ── Menu ─────────────────────────────────────────────────────────────

    #[test]
    fn test_double_toggle_restores_aria_and_icon() {
        let mut engine = engine();
        engine.handle(Event::ToggleMenu);
        assert!(engine.menu_is_open());
        engine.handle(Event::ToggleMenu);

        let nav = engine.page().nav.as_ref().expect("nav present");
        assert!(!nav.aria_expanded);
        assert!(!nav.menu_active);
        assert!(menu::bars_at_rest(nav));
    }

    #[test]
    fn test_nav_click_closes_menu_below_breakpoint() {
        let mut engine = engine();
        engine.page.viewport.width = 390.0;
        engine.handle(Event::ToggleMenu);
        engine.handle(Event::ClickNavLink {
            href: "#about".to_string(),
        });
        assert!(!engine.menu_is_open());
        let nav = engine.page().nav.as_ref().expect("nav present");
        assert!(!nav.aria_expanded);
    }

    #[test]
    fn test_nav_click_keeps_menu_above_breakpoint() {
        let mut engine = engine();
        engine.page.viewport.width = 1280.0;
        engine.handle(Event::ToggleMenu);
        engine.handle(Event::ClickNavLink {
            href: "#about".to_string(),
        });
        assert!(engine.menu_is_open());
    }

    #[test]
    fn test_toggle_skipped_without_nav_controls() {
        let mut page = Page::demo();
        page.nav = None;
        let mut engine = Engine::new(page, Config::default());
        engine.handle(Event::ToggleMenu);
        assert!(!engine.menu_is_open());
    }

    // ── Ancres ───────────────────────────────────────────────────────────

    #[test]
    fn test_nav_click_scrolls_with_header_offset() {
        let mut engine = engine();
        engine.handle(Event::ClickNavLink {
            href: "#about".to_string(),
        });
        // about: top 600, header 80.
        assert_eq!(engine.page().viewport.scroll_y, 520.0);
        assert_eq!(engine.page().last_scroll, Some(ScrollRequest::To(520.0)));
    }

    #[test]
    fn test_home_anchor_scrolls_to_top() {
        let mut engine = engine();
        engine.handle(Event::Scroll { y: 1500.0 });
        engine.handle(Event::ClickAnchor {
            href: "#home".to_string(),
        });
        assert_eq!(engine.page().viewport.scroll_y, 0.0);
    }

    #[test]
    fn test_unknown_anchor_is_noop() {
        let mut engine = engine();
        engine.handle(Event::Scroll { y: 300.0 });
        engine.handle(Event::ClickAnchor {
            href: "#missing".to_string(),
        });
        assert_eq!(engine.page().viewport.scroll_y, 300.0);
    }

    #[test]
    fn test_programmatic_scroll_updates_highlight() {
        let mut engine = engine();
        engine.handle(Event::ClickNavLink {
            href: "#services".to_string(),
        });
        let active: Vec<&str> = engine
            .page()
            .nav_links
            .iter()
            .filter(|l| l.highlighted)
            .map(|l| l.href.as_str())
            .collect();
        assert_eq!(active, vec!["#services"]);
    }

    // ── Scroll / annonces ────────────────────────────────────────────────

    #[test]
    fn test_scroll_highlights_exactly_one_link() {
        let mut engine = engine();
        for y in [10.0, 700.0, 1500.0, 2300.0] {
            engine.handle(Event::Scroll { y });
            let count = engine
                .page()
                .nav_links
                .iter()
                .filter(|l| l.highlighted)
                .count();
            assert_eq!(count, 1, "scroll_y={y}");
        }
    }

    #[test]
    fn test_announce_debounce_coalesces_scrolls() {
        let mut engine = engine();
        engine.handle(Event::Load);
        engine.handle(Event::Scroll { y: 700.0 });
        engine.advance(60);
        engine.handle(Event::Scroll { y: 720.0 });
        // First deadline (at 100) was cancelled by the second scroll.
        engine.advance(50);
        assert_eq!(engine.current_section(), None);
        engine.advance(50);
        assert_eq!(engine.current_section(), Some("about"));

        let announced: Vec<&str> = engine
            .page()
            .live_messages
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(
            announced,
            vec!["Page loaded successfully", "Now viewing: about section"]
        );
    }

    #[test]
    fn test_announce_only_on_transition() {
        let mut engine = engine();
        engine.handle(Event::Scroll { y: 700.0 });
        engine.advance(100);
        engine.handle(Event::Scroll { y: 710.0 });
        engine.advance(100);
        // Same section twice: a single announcement.
        assert_eq!(engine.page().live_messages.len(), 1);
    }

    // ── Clavier / pointeur ───────────────────────────────────────────────

    #[test]
    fn test_escape_closes_menu_and_restores_focus() {
        let mut engine = engine();
        engine.handle(Event::ToggleMenu);
        engine.handle(Event::KeyDown(Key::Escape));
        assert!(!engine.menu_is_open());
        assert_eq!(engine.page().focused, Some(FocusTarget::MenuToggle));
        let nav = engine.page().nav.as_ref().expect("nav present");
        assert!(menu::bars_at_rest(nav));
    }

    #[test]
    fn test_escape_with_closed_menu_is_noop() {
        let mut engine = engine();
        engine.handle(Event::KeyDown(Key::Escape));
        assert_eq!(engine.page().focused, None);
    }

    #[test]
    fn test_pointer_mode_toggles_body_class() {
        let mut engine = engine();
        engine.handle(Event::MouseDown);
        assert!(engine.page().has_body_class("using-mouse"));
        engine.handle(Event::KeyDown(Key::Tab));
        assert!(!engine.page().has_body_class("using-mouse"));
    }

    // ── Chargement ───────────────────────────────────────────────────────

    #[test]
    fn test_load_wires_document() {
        let mut engine = engine();
        engine.handle(Event::Load);

        assert!(engine.page().has_body_class("loaded"));
        assert_eq!(
            engine.page().live_messages,
            vec!["Page loaded successfully"]
        );
        // Outbound http(s) link hardened, mailto untouched.
        let links = &engine.page().links;
        assert_eq!(links[0].target.as_deref(), Some("_blank"));
        assert_eq!(links[0].rel.as_deref(), Some("noopener noreferrer"));
        assert!(links[1].target.is_none());
        // Lazy image now observed.
        assert!(engine.page().images[0].observed);
    }

    #[test]
    fn test_lazy_image_loads_once() {
        let mut engine = engine();
        engine.handle(Event::Load);
        engine.handle(Event::ImageVisible {
            id: "hero".to_string(),
        });
        let img = &engine.page().images[0];
        assert_eq!(img.src.as_deref(), Some("images/hero.jpg"));
        assert!(img.data_src.is_none());
        assert!(!img.observed);

        // A second visibility event must not re-fire.
        engine.handle(Event::ImageVisible {
            id: "hero".to_string(),
        });
        assert_eq!(engine.page().images[0].src.as_deref(), Some("images/hero.jpg"));
    }

    // ── Formulaire ───────────────────────────────────────────────────────

    #[test]
    fn test_invalid_submit_shows_error_and_starts_no_send() {
        let mut engine = engine();
        engine.handle(Event::SubmitForm);

        let contact = engine.page().form.as_ref().expect("form present");
        let status = contact.status.as_ref().expect("error message shown");
        assert_eq!(status.kind, MessageKind::Error);
        assert_eq!(status.text, "Please fill in all required fields.");
        assert!(!contact.submit.disabled);
        assert_eq!(engine.submit_phase(), SubmitPhase::Idle);

        // No success ever arrives, even past the simulated latency.
        engine.advance(2000);
        let contact = engine.page().form.as_ref().expect("form present");
        assert_eq!(
            contact.status.as_ref().map(|s| s.kind),
            Some(MessageKind::Error)
        );
    }

    #[test]
    fn test_consent_missing_rejected_with_valid_fields() {
        let mut engine = engine();
        fill_valid_form(&mut engine);
        engine.handle(Event::SetConsent(false));
        engine.handle(Event::SubmitForm);

        let contact = engine.page().form.as_ref().expect("form present");
        assert_eq!(
            contact.status.as_ref().map(|s| s.text.as_str()),
            Some("Please consent to your details being stored.")
        );
    }

    #[test]
    fn test_valid_submit_full_lifecycle() {
        let mut engine = engine();
        fill_valid_form(&mut engine);
        engine.handle(Event::SubmitForm);

        // In flight: control disabled, sending label, no message yet.
        let contact = engine.page().form.as_ref().expect("form present");
        assert!(contact.submit.disabled);
        assert_eq!(contact.submit.label, "Sending...");
        assert!(contact.status.is_none());
        assert_eq!(engine.submit_phase(), SubmitPhase::Sending);

        // Confirmation after the simulated latency.
        engine.advance(1500);
        let contact = engine.page().form.as_ref().expect("form present");
        let status = contact.status.as_ref().expect("success message shown");
        assert_eq!(status.kind, MessageKind::Success);
        assert!(!contact.submit.disabled);
        assert_eq!(contact.submit.label, "Send Message");
        assert!(contact.name.is_empty(), "form is reset");
        assert!(!contact.consent);
        assert_eq!(
            engine.page().last_scroll,
            Some(ScrollRequest::MessageIntoView)
        );
    }

    #[test]
    fn test_message_removed_after_total_dismissal_delay() {
        let mut engine = engine();
        fill_valid_form(&mut engine);
        engine.handle(Event::SubmitForm);
        engine.advance(1500); // success shown at T = 1500

        engine.advance(4999);
        let form_status = |e: &Engine| e.page().form.as_ref().and_then(|f| f.status.clone());
        assert!(form_status(&engine).is_some_and(|s| !s.fading));

        engine.advance(1); // T + 5000: fade begins
        assert!(form_status(&engine).is_some_and(|s| s.fading));

        engine.advance(499);
        assert!(form_status(&engine).is_some());
        engine.advance(1); // T + 5500: removed
        assert!(form_status(&engine).is_none());
    }

    #[test]
    fn test_submit_ignored_while_sending() {
        let mut engine = engine();
        fill_valid_form(&mut engine);
        engine.handle(Event::SubmitForm);
        engine.handle(Event::SubmitForm); // ignored
        engine.advance(1500);

        let contact = engine.page().form.as_ref().expect("form present");
        assert_eq!(
            contact.status.as_ref().map(|s| s.kind),
            Some(MessageKind::Success)
        );
        // One send only: once idle again, the queue holds just the
        // message dismissal chain.
        assert_eq!(engine.submit_phase(), SubmitPhase::Idle);
    }

    #[test]
    fn test_error_then_success_message_replacement() {
        let mut engine = engine();
        engine.handle(Event::SubmitForm); // error message, generation 1
        fill_valid_form(&mut engine);
        engine.handle(Event::SubmitForm);
        engine.advance(1500); // success replaces the error

        // The error's dismissal chain is stale; the success message must
        // survive until its own deadline.
        engine.advance(4000);
        let contact = engine.page().form.as_ref().expect("form present");
        let status = contact.status.as_ref().expect("success still shown");
        assert_eq!(status.kind, MessageKind::Success);
        assert!(!status.fading);
    }

    #[test]
    fn test_submit_skipped_without_form() {
        let mut page = Page::demo();
        page.form = None;
        let mut engine = Engine::new(page, Config::default());
        engine.handle(Event::SubmitForm);
        assert_eq!(engine.submit_phase(), SubmitPhase::Idle);
    }
}
