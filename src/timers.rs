//! File d'échéances déterministe — l'unique source d'asynchronie du crate.
//!
//! Le navigateur fournit `setTimeout`/`clearTimeout` ; ici l'horloge est
//! explicite : le moteur avance le temps lui-même (`advance`), ce qui rend
//! chaque scénario de timers rejouable à l'identique dans les tests.
//!
//! Trois consommateurs : la latence simulée d'envoi du formulaire, le
//! cycle de vie du message de statut (fondu puis retrait), et le debounce
//! de l'annonceur de sections — seul timer réarmé (chaque scroll annule
//! l'échéance en attente et en planifie une nouvelle).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashSet;

/// Actions différées. Enum fermé : pas de callbacks boxés, le moteur
/// interprète chaque variante au moment où elle échoit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Fin de la latence simulée d'envoi du formulaire.
    FinishSubmit,
    /// Début du fondu du message de statut de génération donnée.
    BeginMessageFade(u64),
    /// Retrait du message de statut de génération donnée.
    RemoveMessage(u64),
    /// Recalcul de la section courante pour l'annonce.
    AnnounceSections,
}

/// Identifiant opaque d'une échéance planifiée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// File d'échéances ordonnée par (deadline, ordre de planification).
///
/// À deadline égale, l'ordre de planification est respecté (FIFO) — le
/// retrait d'un message planifié avant une annonce part donc avant elle.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    cancelled: HashSet<TimerId>,
    next_seq: u64,
}

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    deadline_ms: u64,
    seq: u64,
    id: TimerId,
    action: TimerAction,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.deadline_ms, self.seq).cmp(&(other.deadline_ms, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Planifie `action` à `now_ms + delay_ms`. Retourne un identifiant
    /// utilisable avec [`TimerQueue::cancel`].
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: TimerAction) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.heap.push(Reverse(Entry {
            deadline_ms: now_ms.saturating_add(delay_ms),
            seq,
            id,
            action,
        }));
        id
    }

    /// Annule une échéance. Sans effet si elle a déjà été tirée.
    pub fn cancel(&mut self, id: TimerId) {
        self.cancelled.insert(id);
    }

    /// Tire toutes les échéances dont la deadline est ≤ `now_ms`,
    /// dans l'ordre (deadline, planification).
    pub fn advance(&mut self, now_ms: u64) -> Vec<TimerAction> {
        let mut due = Vec::new();
        loop {
            match self.heap.peek() {
                Some(Reverse(entry)) if entry.deadline_ms <= now_ms => {}
                _ => break,
            }
            if let Some(Reverse(entry)) = self.heap.pop()
                && !self.cancelled.remove(&entry.id)
            {
                due.push(entry.action);
            }
        }
        due
    }

    /// Prochaine deadline non annulée, s'il en reste une. Purge au
    /// passage les entrées annulées en tête de file.
    pub fn next_deadline(&mut self) -> Option<u64> {
        loop {
            let entry = self.heap.peek()?;
            let Reverse(entry) = entry;
            if self.cancelled.contains(&entry.id) {
                let id = entry.id;
                self.heap.pop();
                self.cancelled.remove(&id);
                continue;
            }
            return Some(entry.deadline_ms);
        }
    }

    /// Nombre d'échéances encore en attente, annulations déduites.
    pub fn pending(&self) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(entry)| !self.cancelled.contains(&entry.id))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}
