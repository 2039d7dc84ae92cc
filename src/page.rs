//! Modèle de document headless — la surface d'intégration du crate.
//!
//! Le contrat de balisage (panneau de menu, bouton toggle, liens de
//! navigation, sections identifiées, formulaire de contact nommé, images
//! différées, liens sortants) est porté par des types plutôt que par des
//! sélecteurs : le moteur manipule ce modèle, les tests l'inspectent, et
//! le binaire peut le charger depuis un fichier TOML.
//!
//! Les éléments optionnels du document (bouton toggle, formulaire) sont
//! des `Option` : absents, le comportement correspondant est simplement
//! sauté, jamais en erreur.
//!
//! Aucune dépendance graphique — ce module est purement un état.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erreur de chargement d'une description de page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("cannot read page file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid page description: {0}")]
    Parse(#[from] toml::de::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Éléments du document
// ─────────────────────────────────────────────────────────────────────────────

/// Fenêtre de visualisation : largeur (pour le breakpoint mobile) et
/// position de défilement verticale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            scroll_y: 0.0,
        }
    }
}

/// Requête de défilement émise par les comportements.
///
/// Le défilement demandé est toujours doux (smooth) ; la requête est
/// conservée telle quelle pour que les tests puissent l'observer.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollRequest {
    /// Vers une position verticale absolue (déjà bornée à 0).
    To(f64),
    /// Amener le message de statut du formulaire dans la zone visible.
    MessageIntoView,
}

/// Une barre de l'icône hamburger, avec ses styles inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconBar {
    pub transform: Option<String>,
    pub opacity: Option<String>,
}

impl IconBar {
    /// Efface les styles inline (icône au repos).
    pub fn clear(&mut self) {
        self.transform = None;
        self.opacity = None;
    }

    pub fn is_clear(&self) -> bool {
        self.transform.is_none() && self.opacity.is_none()
    }
}

/// Bouton toggle du menu mobile et panneau de navigation associé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavControls {
    /// Classe « active » du panneau de menu.
    pub menu_active: bool,
    /// Miroir accessibilité de l'état ouvert (`aria-expanded`).
    pub aria_expanded: bool,
    /// Les trois barres de l'icône.
    pub bars: [IconBar; 3],
}

/// Lien du menu de navigation (`href="#id"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    /// Surbrillance pilotée par la position de défilement.
    pub highlighted: bool,
}

/// Région verticale identifiée de la page, associée à un lien de nav.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Nature d'un message de statut du formulaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

/// Nœud de message transitoire inséré avant le bouton d'envoi.
///
/// La génération départage un message et son remplaçant : les timers de
/// retrait du premier ne doivent pas toucher le second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
    pub generation: u64,
    /// Fondu de sortie entamé (opacité 0, transition posée).
    pub fading: bool,
}

/// Bouton d'envoi du formulaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitControl {
    pub disabled: bool,
    pub label: String,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            disabled: false,
            label: "Send Message".to_string(),
        }
    }
}

/// Formulaire de contact avec ses champs nommés.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub consent: bool,
    pub submit: SubmitControl,
    /// Au plus un message de statut à la fois.
    pub status: Option<StatusMessage>,
}

impl ContactForm {
    /// Vide tous les champs (équivalent de `form.reset()`).
    pub fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
        self.phone.clear();
        self.message.clear();
        self.consent = false;
    }
}

/// Image à chargement différé (`data-src` → `src`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyImage {
    pub id: String,
    pub src: Option<String>,
    pub data_src: Option<String>,
    /// Sous observation de visibilité.
    pub observed: bool,
}

/// Lien ordinaire (hors menu), candidat au durcissement sortant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub href: String,
    pub target: Option<String>,
    pub rel: Option<String>,
}

/// Élément porteur du focus clavier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// Le bouton toggle du menu mobile.
    MenuToggle,
}

// ─────────────────────────────────────────────────────────────────────────────
// Page
// ─────────────────────────────────────────────────────────────────────────────

/// Le document complet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub viewport: Viewport,
    pub nav: Option<NavControls>,
    pub nav_links: Vec<NavLink>,
    pub sections: Vec<Section>,
    pub form: Option<ContactForm>,
    pub images: Vec<LazyImage>,
    pub links: Vec<Link>,
    /// Classes posées sur `<body>` (`loaded`, `using-mouse`).
    pub body_classes: Vec<String>,
    /// Historique de la région live polie (annonces lecteur d'écran).
    pub live_messages: Vec<String>,
    /// Élément focusé, si un comportement a déplacé le focus.
    #[serde(skip)]
    pub focused: Option<FocusTarget>,
    /// Dernière requête de défilement émise.
    #[serde(skip)]
    pub last_scroll: Option<ScrollRequest>,
}

impl Page {
    /// Charge une description de page depuis un fichier TOML.
    pub fn from_toml_file(path: &Path) -> Result<Self, PageError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Page de démonstration intégrée : quatre sections contiguës, un
    /// formulaire, une image différée et quelques liens sortants.
    pub fn demo() -> Self {
        let sections = [
            ("home", 0.0, 600.0),
            ("about", 600.0, 800.0),
            ("services", 1400.0, 700.0),
            ("contact", 2100.0, 900.0),
        ];
        Self {
            viewport: Viewport::default(),
            nav: Some(NavControls::default()),
            nav_links: sections
                .iter()
                .map(|(id, _, _)| NavLink {
                    href: format!("#{id}"),
                    label: id.to_string(),
                    highlighted: false,
                })
                .collect(),
            sections: sections
                .iter()
                .map(|(id, top, height)| Section {
                    id: id.to_string(),
                    top: *top,
                    height: *height,
                })
                .collect(),
            form: Some(ContactForm::default()),
            images: vec![LazyImage {
                id: "hero".to_string(),
                src: None,
                data_src: Some("images/hero.jpg".to_string()),
                observed: false,
            }],
            links: vec![
                Link {
                    href: "https://example.org/partners".to_string(),
                    ..Link::default()
                },
                Link {
                    href: "mailto:hello@example.org".to_string(),
                    ..Link::default()
                },
            ],
            ..Self::default()
        }
    }

    // ── Capacité « element finder » ──────────────────────────────────────

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn nav_link_mut(&mut self, href: &str) -> Option<&mut NavLink> {
        self.nav_links.iter_mut().find(|l| l.href == href)
    }

    pub fn image_mut(&mut self, id: &str) -> Option<&mut LazyImage> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    // ── Capacité « scroller » ────────────────────────────────────────────

    /// Défilement doux vers `top` (borné à 0). Met à jour la position et
    /// conserve la requête pour inspection.
    pub fn scroll_to(&mut self, top: f64) {
        let top = top.max(0.0);
        self.viewport.scroll_y = top;
        self.last_scroll = Some(ScrollRequest::To(top));
    }

    /// Demande d'amener le message de statut dans la zone visible.
    pub fn scroll_message_into_view(&mut self) {
        self.last_scroll = Some(ScrollRequest::MessageIntoView);
    }

    // ── Classes du body ──────────────────────────────────────────────────

    pub fn add_body_class(&mut self, class: &str) {
        if !self.has_body_class(class) {
            self.body_classes.push(class.to_string());
        }
    }

    pub fn remove_body_class(&mut self, class: &str) {
        self.body_classes.retain(|c| c != class);
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.body_classes.iter().any(|c| c == class)
    }

    // ── Région live ──────────────────────────────────────────────────────

    /// Annonce polie pour les technologies d'assistance.
    pub fn announce(&mut self, text: &str) {
        self.live_messages.push(text.to_string());
    }
}
