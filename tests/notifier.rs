use std::time::{Duration, Instant};

use simscope::{OutboundMessage, OutboundNotifier, Result, Transport};

const D: Duration = Duration::from_millis(50);

/// Records every transmitted text together with the simulated instant.
struct Timed {
    now: Instant,
    sent: Vec<(Instant, String)>,
}

impl Transport for Timed {
    fn send_text(&mut self, text: &str) -> Result<()> {
        self.sent.push((self.now, text.to_string()));
        Ok(())
    }
}

/// Drive `poll` in 1 ms steps from `start` for `span`.
fn run_clock(n: &mut OutboundNotifier, out: &mut Timed, start: Instant, span: Duration) {
    let mut t = start;
    while t <= start + span {
        out.now = t;
        n.poll(t, out).unwrap();
        t += Duration::from_millis(1);
    }
}

#[test]
fn burst_is_sent_in_order_at_least_delay_apart() {
    let t0 = Instant::now();
    let mut n = OutboundNotifier::new(D);
    let mut out = Timed { now: t0, sent: Vec::new() };
    for c in 0..5 {
        n.notify(OutboundMessage::Value { channel: c, value: c as f64 }, t0);
    }
    run_clock(&mut n, &mut out, t0, Duration::from_secs(1));

    let texts: Vec<&str> = out.sent.iter().map(|(_, s)| s.as_str()).collect();
    assert_eq!(texts, vec!["0,0", "1,1", "2,2", "3,3", "4,4"]);
    assert!(out.sent[0].0 >= t0 + D, "first send waits one delay");
    for pair in out.sent.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= D);
    }
    assert_eq!(n.pending(), 0);
    assert_eq!(n.sent_count(), 5);
}

#[test]
fn duplicate_edits_are_not_coalesced() {
    let t0 = Instant::now();
    let mut n = OutboundNotifier::new(D);
    let mut out = Timed { now: t0, sent: Vec::new() };
    n.notify(OutboundMessage::Value { channel: 0, value: 1.0 }, t0);
    n.notify(OutboundMessage::Value { channel: 0, value: 1.0 }, t0);
    run_clock(&mut n, &mut out, t0, Duration::from_millis(200));
    assert_eq!(out.sent.len(), 2);
}

#[test]
fn message_after_idle_waits_full_delay() {
    let t0 = Instant::now();
    let mut n = OutboundNotifier::new(D);
    let mut out = Timed { now: t0, sent: Vec::new() };
    n.notify(OutboundMessage::Reset { channel: 0 }, t0);
    run_clock(&mut n, &mut out, t0, Duration::from_millis(100));
    assert_eq!(out.sent.len(), 1);

    let t1 = t0 + Duration::from_millis(500);
    n.notify(OutboundMessage::Reset { channel: 1 }, t1);
    assert_eq!(n.next_flush(), Some(t1 + D));
    run_clock(&mut n, &mut out, t1, Duration::from_millis(100));
    assert_eq!(out.sent[1].0, t1 + D);
    assert_eq!(out.sent[1].1, "1,reset");
}

#[test]
fn late_poll_sends_one_message_at_a_time() {
    let t0 = Instant::now();
    let mut n = OutboundNotifier::new(D);
    let mut out = Timed { now: t0, sent: Vec::new() };
    n.notify(OutboundMessage::Reset { channel: 0 }, t0);
    n.notify(OutboundMessage::Reset { channel: 1 }, t0);

    let late = t0 + Duration::from_secs(3);
    out.now = late;
    n.poll(late, &mut out).unwrap();
    n.poll(late, &mut out).unwrap();
    assert_eq!(out.sent.len(), 1);
    assert_eq!(n.next_flush(), Some(late + D));
}

#[test]
fn nothing_queued_means_nothing_sent() {
    let t0 = Instant::now();
    let mut n = OutboundNotifier::new(D);
    let mut out = Timed { now: t0, sent: Vec::new() };
    run_clock(&mut n, &mut out, t0, Duration::from_millis(100));
    assert!(out.sent.is_empty());
    assert_eq!(n.next_flush(), None);
}
