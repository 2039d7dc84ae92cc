//! Défilement — surbrillance des liens de nav et suivi de section.
//!
//! Deux lectures distinctes de la même géométrie :
//! - la passe de surbrillance, rejouée à chaque événement de scroll, qui
//!   active le lien dont la section contient la position de défilement
//!   (avec une marge de rattrapage au-dessus de chaque section) ;
//! - le suiveur de section, derrière un debounce, qui sonde un point
//!   légèrement sous le haut du viewport et ne signale que les
//!   transitions — c'est lui qui alimente les annonces d'accessibilité.
//!
//! Aucune dépendance graphique — ce module est purement logique.

use crate::page::{NavLink, Section};

/// Passe de surbrillance.
///
/// Un lien est actif si et seulement si la position de défilement tombe
/// dans `(top − lookback, top − lookback + height]` de sa section. Sur
/// des sections contiguës ces fenêtres pavent l'axe vertical : au plus un
/// lien est actif. Les liens sans section correspondante sont laissés
/// tels quels.
pub fn update_highlights(
    sections: &[Section],
    nav_links: &mut [NavLink],
    scroll_y: f64,
    lookback: f64,
) {
    for section in sections {
        let shifted_top = section.top - lookback;
        let active = scroll_y > shifted_top && scroll_y <= shifted_top + section.height;
        if let Some(link) = nav_links
            .iter_mut()
            .find(|l| l.href.strip_prefix('#') == Some(section.id.as_str()))
        {
            link.highlighted = active;
        }
    }
}

/// Suiveur de la section actuellement consultée.
///
/// L'état « section courante » vit ici, pas dans une variable de module :
/// le moteur en possède une instance et les tests en créent à volonté.
#[derive(Debug, Default)]
pub struct SectionTracker {
    current: Option<String>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sonde les sections au point `probe` (position de défilement plus
    /// l'offset configuré). Retourne l'identifiant de la nouvelle section
    /// courante si elle vient de changer, `None` sinon.
    ///
    /// Quand plusieurs sections contiennent le point (chevauchement), la
    /// dernière dans l'ordre du document gagne. Quand aucune ne le
    /// contient, la section courante reste inchangée.
    pub fn observe(&mut self, sections: &[Section], probe: f64) -> Option<String> {
        let mut hit: Option<&Section> = None;
        for section in sections {
            if probe >= section.top && probe < section.top + section.height {
                hit = Some(section);
            }
        }
        let section = hit?;
        if self.current.as_deref() == Some(section.id.as_str()) {
            return None;
        }
        self.current = Some(section.id.clone());
        Some(section.id.clone())
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}
