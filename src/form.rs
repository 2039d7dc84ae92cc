//! Formulaire de contact — validation, envoi simulé, messages de statut.
//!
//! La validation est séquentielle, premier échec gagnant : champs requis,
//! puis consentement, puis forme de l'adresse email. Chaque échec est une
//! variante de [`ValidationError`] dont le `Display` est le message
//! affiché tel quel à l'utilisateur (pas d'erreurs par champ).
//!
//! L'envoi passe par le trait [`SubmissionBackend`]. La seule
//! implémentation fournie est une simulation locale : rien ne part sur le
//! réseau. C'est un emplacement réservé, pas un oubli — brancher une
//! vraie intégration serveur ici avant toute mise en production.

use thiserror::Error;
use tracing::debug;

use crate::page::{ContactForm, MessageKind, StatusMessage};

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Instantané des champs au moment de la soumission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    /// Jamais validé : champ facultatif, transmis tel quel.
    pub phone: String,
    pub message: String,
    pub consent: bool,
}

impl FormData {
    /// Capture les valeurs courantes du formulaire.
    pub fn capture(form: &ContactForm) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            message: form.message.clone(),
            consent: form.consent,
        }
    }
}

/// Échec de validation. Le `Display` de chaque variante est le message
/// utilisateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingRequired,
    #[error("Please consent to your details being stored.")]
    ConsentRequired,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// Valide un instantané de formulaire, dans l'ordre des variantes.
pub fn validate(data: &FormData) -> Result<(), ValidationError> {
    if data.name.trim().is_empty()
        || data.email.trim().is_empty()
        || data.message.trim().is_empty()
    {
        return Err(ValidationError::MissingRequired);
    }
    if !data.consent {
        return Err(ValidationError::ConsentRequired);
    }
    if !email_is_valid(&data.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Forme minimale d'une adresse : `local@domaine`, où le domaine contient
/// un point encadré de caractères, sans espace ni second `@` nulle part.
///
/// Vérification à la main plutôt qu'une dépendance regex pour un seul
/// motif — même arbitrage que le décodage d'URL du module de config.
fn email_is_valid(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    if email.chars().filter(|&c| c == '@').count() != 1 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    // Un point ni premier ni dernier caractère du domaine.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + c.len_utf8() < domain.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Envoi
// ─────────────────────────────────────────────────────────────────────────────

/// Phase d'envoi. Les soumissions reçues pendant `Sending` sont ignorées
/// (le bouton est désactivé, mais la machine ne s'y fie pas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Sending,
}

/// Backend d'envoi du formulaire.
///
/// EMPLACEMENT RÉSERVÉ : la simulation est la seule implémentation.
/// L'interface existe pour qu'une intégration serveur réelle puisse la
/// remplacer sans toucher au moteur.
pub trait SubmissionBackend {
    /// Accepte un envoi déjà validé et retourne la latence (ms) après
    /// laquelle la confirmation doit être délivrée.
    fn submit(&self, data: &FormData) -> u64;
}

/// Simulation locale : latence fixe, succès systématique, aucun réseau.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBackend {
    pub latency_ms: u64,
}

impl SubmissionBackend for SimulatedBackend {
    fn submit(&self, data: &FormData) -> u64 {
        debug!(name = %data.name, email = %data.email, "Simulated submission accepted");
        self.latency_ms
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cycle de vie du message de statut
// ─────────────────────────────────────────────────────────────────────────────

/// Remplace le message de statut courant par un nouveau, de génération
/// `generation`. Tout message antérieur disparaît immédiatement.
pub fn show_status(form: &mut ContactForm, kind: MessageKind, text: &str, generation: u64) {
    form.status = Some(StatusMessage {
        kind,
        text: text.to_string(),
        generation,
        fading: false,
    });
}

/// Entame le fondu du message de génération `generation`. Sans effet si
/// le message a déjà été remplacé (timer périmé).
pub fn begin_fade(form: &mut ContactForm, generation: u64) -> bool {
    match &mut form.status {
        Some(status) if status.generation == generation => {
            status.fading = true;
            true
        }
        _ => false,
    }
}

/// Retire le message de génération `generation`, s'il est encore là.
pub fn remove_status(form: &mut ContactForm, generation: u64) -> bool {
    match &form.status {
        Some(status) if status.generation == generation => {
            form.status = None;
            true
        }
        _ => false,
    }
}
