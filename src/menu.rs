//! Menu mobile — machine à états du toggle et visuels de l'icône.
//!
//! L'état ouvert/fermé appartient à [`MenuState`] ; le document n'en
//! porte que les reflets (classe du panneau, `aria-expanded`, styles des
//! barres de l'icône), posés via [`apply`]. Le basculement est idempotent
//! dans les deux sens : deux toggles ramènent exactement à l'état initial.
//!
//! Aucune dépendance graphique — ce module est purement logique.

use crate::page::{IconBar, NavControls};

/// Transforms inline des barres quand le menu est ouvert (icône « X »).
const BAR_TOP_OPEN: &str = "rotate(45deg) translateY(10px)";
const BAR_BOTTOM_OPEN: &str = "rotate(-45deg) translateY(-10px)";

/// État logique du menu mobile.
#[derive(Debug, Default)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bascule l'état ouvert/fermé. Retourne le nouvel état.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Force la fermeture. Retourne `true` si le menu était ouvert.
    pub fn close(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        was_open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Reflète `open` dans le document : classe du panneau, miroir
/// `aria-expanded`, et styles des trois barres de l'icône.
pub fn apply(nav: &mut NavControls, open: bool) {
    nav.menu_active = open;
    nav.aria_expanded = open;
    if open {
        nav.bars[0].transform = Some(BAR_TOP_OPEN.to_string());
        nav.bars[1].opacity = Some("0".to_string());
        nav.bars[2].transform = Some(BAR_BOTTOM_OPEN.to_string());
    } else {
        for bar in &mut nav.bars {
            bar.clear();
        }
    }
}

/// Vrai si les trois barres sont au repos (aucun style inline).
pub fn bars_at_rest(nav: &NavControls) -> bool {
    nav.bars.iter().all(IconBar::is_clear)
}
