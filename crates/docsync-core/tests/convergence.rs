use docsync_core::{
    DocumentSnapshot, InboundContent, InboundMessage, OutboundContent, RangeSpec, SyncSession,
    apply, diff,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Minimal peer: applies every message it receives and reports its own edits against the last
/// state it shared.
struct Peer {
    doc: DocumentSnapshot,
    shadow: DocumentSnapshot,
}

impl Peer {
    fn new() -> Self {
        Self {
            doc: DocumentSnapshot::new(),
            shadow: DocumentSnapshot::new(),
        }
    }

    fn handle(&mut self, content: OutboundContent) {
        match content {
            OutboundContent::Document(doc) => {
                self.doc = doc.clone();
                self.shadow = doc;
            }
            OutboundContent::Diff(script) => {
                self.doc = apply(&script, &self.doc).unwrap();
                self.shadow = apply(&script, &self.shadow).unwrap();
            }
            OutboundContent::ChangedLocally | OutboundContent::NoContentChange => {}
        }
    }

    fn message(&mut self) -> InboundMessage {
        let content = if self.doc == self.shadow {
            InboundContent::NoContentChange
        } else {
            InboundContent::Diff(diff(&self.shadow, &self.doc))
        };
        self.shadow = self.doc.clone();
        let end = self.doc.char_count();
        InboundMessage {
            content,
            selection: RangeSpec::Offsets { start: end, end },
            focused: true,
        }
    }
}

fn random_edit(rng: &mut StdRng, text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let at = rng.gen_range(0..=chars.len());
    if !chars.is_empty() && rng.gen_bool(0.4) {
        let end = rng.gen_range(at..=chars.len());
        chars.drain(at..end);
    } else {
        let alphabet = ['a', 'b', 'c', ' ', '\n', 'é', '你'];
        let len = rng.gen_range(1..=5);
        let inserted: Vec<char> = (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();
        chars.splice(at..at, inserted);
    }
    chars.into_iter().collect()
}

fn run(seed: u64, rounds: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut host = SyncSession::new("initial text\nsecond row");
    let mut peer = Peer::new();

    peer.handle(host.outbound().content);
    assert_eq!(peer.doc.text(), host.text());

    for round in 0..rounds {
        // Only one side edits between round trips.
        if rng.gen_bool(0.5) {
            let edited = random_edit(&mut rng, &peer.doc.text());
            peer.doc = peer.doc.with_text(&edited);
        } else {
            let edited = random_edit(&mut rng, &host.text());
            host.set_text(&edited);
        }

        host.receive(peer.message()).unwrap();
        peer.handle(host.outbound().content);

        assert_eq!(
            peer.doc.text(),
            host.text(),
            "seed {seed} diverged at round {round}"
        );
        assert_eq!(host.shadow(), host.document());
    }
}

#[test]
fn test_convergence_with_random_edits() {
    for seed in 0..20 {
        run(seed, 50);
    }
}

#[test]
fn test_host_edits_are_collected_by_next_round_trip() {
    let mut host = SyncSession::new("abc");
    let mut peer = Peer::new();
    peer.handle(host.outbound().content);

    host.set_text("abc and more");
    let signal = host.outbound();
    assert_eq!(signal.content, OutboundContent::ChangedLocally);
    peer.handle(signal.content);
    assert_eq!(peer.doc.text(), "abc");

    host.receive(peer.message()).unwrap();
    peer.handle(host.outbound().content);
    assert_eq!(peer.doc.text(), "abc and more");
}
