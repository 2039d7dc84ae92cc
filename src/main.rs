//! Point d'entrée de Sitewire.
//!
//! Usage :
//!   sitewire [page.toml]
//!
//! Exemples :
//!   cargo run                       → page de démonstration intégrée
//!   cargo run -- vitrine.toml       → document décrit dans vitrine.toml
//!
//! Le binaire charge la page, déclenche l'événement de chargement puis
//! lit des événements ligne à ligne sur stdin :
//!
//!   scroll 700          défilement à 700 px
//!   toggle              bouton du menu mobile
//!   nav #about          clic sur un lien du menu
//!   anchor #            clic sur une ancre hors menu (retour en haut)
//!   key escape|tab      touche clavier
//!   mousedown           appui pointeur (mode souris)
//!   fill name Ada       saisie d'un champ (name|email|phone|message)
//!   consent on|off      case de consentement
//!   submit              soumission du formulaire
//!   visible hero        une image observée devient visible
//!   wait 1500           avance l'horloge logique de 1500 ms
//!   show                état courant du document
//!   quit                fin

use std::env;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;

use sitewire::config::Config;
use sitewire::engine::{Engine, Event, Field, Key};
use sitewire::page::Page;

fn main() -> Result<(), Box<dyn Error>> {
    // ── 1. Logging / Tracing ───────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // ── 2. Configuration ───────────────────────────────────────────────
    let config = Config::load();

    // ── 3. Document ────────────────────────────────────────────────────
    let page = match env::args().nth(1) {
        Some(path) => Page::from_toml_file(Path::new(&path))?,
        None => Page::demo(),
    };

    // ── 4. Moteur + chargement ─────────────────────────────────────────
    let mut engine = Engine::new(page, config);
    engine.handle(Event::Load);

    // ── 5. Pilote d'événements ─────────────────────────────────────────
    run_driver(&mut engine)
}

/// Boucle de lecture des événements. Une entrée inconnue est signalée,
/// jamais fatale.
fn run_driver(engine: &mut Engine) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        match command {
            "scroll" => match words.next().and_then(|w| w.parse::<f64>().ok()) {
                Some(y) => engine.handle(Event::Scroll { y }),
                None => println!("usage: scroll <pixels>"),
            },
            "toggle" => engine.handle(Event::ToggleMenu),
            "nav" | "anchor" => match words.next() {
                Some(href) => {
                    let href = href.to_string();
                    if command == "nav" {
                        engine.handle(Event::ClickNavLink { href });
                    } else {
                        engine.handle(Event::ClickAnchor { href });
                    }
                }
                None => println!("usage: {command} <#ancre>"),
            },
            "key" => match words.next() {
                Some("escape") => engine.handle(Event::KeyDown(Key::Escape)),
                Some("tab") => engine.handle(Event::KeyDown(Key::Tab)),
                _ => println!("usage: key escape|tab"),
            },
            "mousedown" => engine.handle(Event::MouseDown),
            "fill" => {
                let field = match words.next() {
                    Some("name") => Some(Field::Name),
                    Some("email") => Some(Field::Email),
                    Some("phone") => Some(Field::Phone),
                    Some("message") => Some(Field::Message),
                    _ => None,
                };
                let value = words.collect::<Vec<_>>().join(" ");
                match field {
                    Some(field) => engine.handle(Event::EditField { field, value }),
                    None => println!("usage: fill name|email|phone|message <valeur>"),
                }
            }
            "consent" => match words.next() {
                Some("on") => engine.handle(Event::SetConsent(true)),
                Some("off") => engine.handle(Event::SetConsent(false)),
                _ => println!("usage: consent on|off"),
            },
            "submit" => engine.handle(Event::SubmitForm),
            "visible" => match words.next() {
                Some(id) => engine.handle(Event::ImageVisible { id: id.to_string() }),
                None => println!("usage: visible <id-image>"),
            },
            "wait" => match words.next().and_then(|w| w.parse::<u64>().ok()) {
                Some(ms) => engine.advance(ms),
                None => println!("usage: wait <ms>"),
            },
            "show" => print_state(engine),
            "quit" | "exit" => break,
            other => println!("commande inconnue : {other} (show, quit...)"),
        }
    }
    Ok(())
}

/// Résumé de l'état observable du document.
fn print_state(engine: &Engine) {
    let page = engine.page();
    println!(
        "t={}ms  scroll={}px  menu={}  section={}",
        engine.now_ms(),
        page.viewport.scroll_y,
        if engine.menu_is_open() { "ouvert" } else { "fermé" },
        engine.current_section().unwrap_or("—"),
    );
    for link in &page.nav_links {
        if link.highlighted {
            println!("  nav active : {}", link.href);
        }
    }
    if let Some(form) = &page.form {
        println!(
            "  formulaire : bouton \"{}\"{}",
            form.submit.label,
            if form.submit.disabled {
                " (désactivé)"
            } else {
                ""
            },
        );
        if let Some(status) = &form.status {
            println!(
                "  message {:?} : {}{}",
                status.kind,
                status.text,
                if status.fading { " (fondu)" } else { "" },
            );
        }
    }
    if !page.body_classes.is_empty() {
        println!("  body : {}", page.body_classes.join(" "));
    }
    if let Some(last) = page.live_messages.last() {
        println!("  annonce : {last}");
    }
}
