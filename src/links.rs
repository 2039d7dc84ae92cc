//! Liens — résolution des ancres internes et durcissement des liens sortants.
//!
//! Deux responsabilités voisines :
//! - transformer un `href="#id"` en cible de défilement (position de la
//!   section moins la hauteur de l'en-tête fixe) ;
//! - poser `target="_blank"` et `rel="noopener noreferrer"` sur les liens
//!   absolus http/https qui n'ont pas déjà de `target`, pour couper
//!   l'accès `window.opener` et la fuite de referrer.

use url::Url;

use crate::page::{Link, Section};

/// Cible résolue d'un clic sur une ancre interne.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorTarget {
    /// Haut de page (`#` nu, ou l'ancre d'accueil `#home`).
    Top,
    /// Défilement vers une position verticale absolue.
    Offset(f64),
    /// Aucune section ne porte cet identifiant : aucune action.
    None,
}

/// Résout un `href` d'ancre vers sa cible de défilement.
///
/// La position retournée est `top de section − header_offset`, bornée à 0
/// pour les sections collées au haut de page.
pub fn resolve_anchor(href: &str, sections: &[Section], header_offset: f64) -> AnchorTarget {
    if href == "#" || href == "#home" {
        return AnchorTarget::Top;
    }
    let Some(id) = href.strip_prefix('#') else {
        return AnchorTarget::None;
    };
    match sections.iter().find(|s| s.id == id) {
        Some(section) => AnchorTarget::Offset((section.top - header_offset).max(0.0)),
        None => AnchorTarget::None,
    }
}

/// Vrai si le `href` est un lien sortant : URL absolue de schéma http(s).
///
/// Les ancres, chemins relatifs et `mailto:` ne parsent pas comme http(s)
/// et ne sont donc jamais durcis.
pub fn is_outbound(href: &str) -> bool {
    Url::parse(href).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Durcit les liens sortants sans `target` explicite. Retourne le nombre
/// de liens modifiés. Repasser sur des liens déjà durcis est sans effet.
pub fn harden_outbound(links: &mut [Link]) -> usize {
    let mut hardened = 0;
    for link in links {
        if link.target.is_none() && is_outbound(&link.href) {
            link.target = Some("_blank".to_string());
            link.rel = Some("noopener noreferrer".to_string());
            hardened += 1;
        }
    }
    hardened
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section {
                id: "home".to_string(),
                top: 0.0,
                height: 600.0,
            },
            Section {
                id: "about".to_string(),
                top: 600.0,
                height: 800.0,
            },
            Section {
                id: "intro".to_string(),
                top: 50.0,
                height: 100.0,
            },
        ]
    }

    #[test]
    fn test_bare_hash_scrolls_to_top() {
        assert_eq!(resolve_anchor("#", &sections(), 80.0), AnchorTarget::Top);
        assert_eq!(
            resolve_anchor("#home", &sections(), 80.0),
            AnchorTarget::Top
        );
    }

    #[test]
    fn test_anchor_applies_header_offset() {
        assert_eq!(
            resolve_anchor("#about", &sections(), 80.0),
            AnchorTarget::Offset(520.0)
        );
    }

    #[test]
    fn test_anchor_target_clamped_at_zero() {
        // Section top (50) sits above the header offset (80).
        assert_eq!(
            resolve_anchor("#intro", &sections(), 80.0),
            AnchorTarget::Offset(0.0)
        );
    }

    #[test]
    fn test_unknown_or_foreign_href_is_noop() {
        assert_eq!(
            resolve_anchor("#missing", &sections(), 80.0),
            AnchorTarget::None
        );
        assert_eq!(
            resolve_anchor("https://example.org", &sections(), 80.0),
            AnchorTarget::None
        );
    }

    #[test]
    fn test_outbound_detection() {
        assert!(is_outbound("https://example.org/page"));
        assert!(is_outbound("http://example.org"));
        assert!(!is_outbound("#contact"));
        assert!(!is_outbound("/about"));
        assert!(!is_outbound("mailto:hello@example.org"));
        assert!(!is_outbound("httpx://example.org"));
    }

    #[test]
    fn test_harden_sets_both_attributes() {
        let mut links = vec![Link {
            href: "https://example.org".to_string(),
            ..Link::default()
        }];
        assert_eq!(harden_outbound(&mut links), 1);
        assert_eq!(links[0].target.as_deref(), Some("_blank"));
        assert_eq!(links[0].rel.as_deref(), Some("noopener noreferrer"));
    }

    #[test]
    fn test_harden_skips_explicit_target() {
        let mut links = vec![Link {
            href: "https://example.org".to_string(),
            target: Some("_self".to_string()),
            rel: None,
        }];
        assert_eq!(harden_outbound(&mut links), 0);
        assert_eq!(links[0].target.as_deref(), Some("_self"));
        assert!(links[0].rel.is_none());
    }

    #[test]
    fn test_harden_is_idempotent() {
        let mut links = vec![
            Link {
                href: "https://example.org".to_string(),
                ..Link::default()
            },
            Link {
                href: "mailto:hello@example.org".to_string(),
                ..Link::default()
            },
        ];
        assert_eq!(harden_outbound(&mut links), 1);
        assert_eq!(harden_outbound(&mut links), 0);
        assert!(links[1].target.is_none());
    }
}
