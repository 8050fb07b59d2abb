//! Integration test: drive a session end to end against a recording fake
//! transport.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]

use std::cell::RefCell;
use std::io::Cursor;

use futures::executor::block_on;
use sigverify_core::{
    Completion, ErrorKind, HttpReply, HttpRequest, OutcomeBand, Point, Session, SessionState, Slot,
    Stroke, SubmitAttempt, Transport, TransportError, UploadedFile, VerificationClient,
    VerifierConfig,
};
use sigverify_core::charts::ComparisonLog;

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
struct Recording {
    replies: RefCell<Vec<Result<HttpReply, TransportError>>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl Recording {
    fn replying(replies: Vec<Result<HttpReply, TransportError>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: RefCell::new(replies),
            sent: RefCell::default(),
        }
    }

    fn sent(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Transport for Recording {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        self.sent.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Err(TransportError::Network("no reply queued".into())))
    }
}

fn json(status: u16, body: &str) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status,
        body: body.as_bytes().to_vec(),
    })
}

/// A tiny real PNG so MIME sniffing sees genuine content.
fn png_file(name: &str) -> UploadedFile {
    let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([20, 20, 20, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    UploadedFile::new(name, bytes).unwrap()
}

fn config() -> VerifierConfig {
    VerifierConfig {
        endpoint: "http://localhost:5000/api/verify".into(),
        ..VerifierConfig::default()
    }
}

/// Submit once; if a request was admitted, send it and feed the result
/// back.
fn submit(session: &mut Session, client: &VerificationClient<Recording>) -> Option<Completion> {
    match session.begin_submit() {
        SubmitAttempt::Started(pending) => {
            let result = block_on(client.submit(pending.request));
            Some(session.complete(pending.generation, result))
        }
        SubmitAttempt::Rejected(_) | SubmitAttempt::Ignored => None,
    }
}

fn both_uploaded() -> Session {
    let mut session = Session::new(config()).unwrap();
    session.select_file(Slot::Original, png_file("reference.png"));
    session.select_file(Slot::Test, png_file("questioned.png"));
    session
}

#[test]
fn scenario_a_strong_match() {
    let client = VerificationClient::new(
        Recording::replying(vec![json(200, r#"{"match_score": 82}"#)]),
        &config(),
    );
    let mut session = both_uploaded();

    assert_eq!(submit(&mut session, &client), Some(Completion::Applied));
    assert_eq!(
        session.state(),
        SessionState::Succeeded {
            band: OutcomeBand::StrongMatch,
            score: 82.0
        }
    );

    let sent = client.transport().sent.borrow();
    assert_eq!(sent.len(), 1);
    let body = String::from_utf8_lossy(&sent[0].body);
    assert!(body.contains("name=\"original\"; filename=\"reference.png\""));
    assert!(body.contains("name=\"test\"; filename=\"questioned.png\""));
    assert!(body.contains("Content-Type: image/png"));
}

#[test]
fn scenario_b_missing_sample_sends_nothing() {
    let client = VerificationClient::new(Recording::default(), &config());
    let mut session = Session::new(config()).unwrap();
    session.select_file(Slot::Original, png_file("reference.png"));

    assert_eq!(submit(&mut session, &client), None);
    assert_eq!(
        session.state(),
        SessionState::Failed {
            kind: ErrorKind::EmptyInput
        }
    );
    assert_eq!(client.transport().sent(), 0);
}

#[test]
fn scenario_c_server_error() {
    let client = VerificationClient::new(
        Recording::replying(vec![json(500, "Internal Server Error")]),
        &config(),
    );
    let mut session = both_uploaded();
    submit(&mut session, &client);
    assert_eq!(
        session.state(),
        SessionState::Failed {
            kind: ErrorKind::Server
        }
    );
    assert!(session.snapshot().detail.unwrap().contains("500"));
}

#[test]
fn scenario_d_empty_object_is_protocol_error() {
    let client = VerificationClient::new(Recording::replying(vec![json(200, "{}")]), &config());
    let mut session = both_uploaded();
    submit(&mut session, &client);
    assert_eq!(
        session.state(),
        SessionState::Failed {
            kind: ErrorKind::Protocol
        }
    );
    assert_eq!(session.snapshot().score, None);
}

#[test]
fn double_submit_sends_one_request() {
    let client = VerificationClient::new(
        Recording::replying(vec![json(200, r#"{"match_score": 55}"#)]),
        &config(),
    );
    let mut session = both_uploaded();

    let SubmitAttempt::Started(pending) = session.begin_submit() else {
        panic!("first submit should start");
    };
    // Rapid second click while the first request is in flight.
    assert!(matches!(session.begin_submit(), SubmitAttempt::Ignored));

    let result = block_on(client.submit(pending.request));
    session.complete(pending.generation, result);
    assert_eq!(client.transport().sent(), 1);
    assert_eq!(
        session.state(),
        SessionState::Succeeded {
            band: OutcomeBand::PartialMatch,
            score: 55.0
        }
    );
}

#[test]
fn drawn_samples_are_rasterized_and_sent() {
    let client = VerificationClient::new(
        Recording::replying(vec![json(200, r#"{"match": true}"#)]),
        &config(),
    );
    let mut session = Session::new(config()).unwrap();
    let stroke = || Stroke::new(vec![Point::new(10.0, 10.0), Point::new(120.0, 80.0)]);
    session.add_stroke(Slot::Original, stroke());
    session.add_stroke(Slot::Test, stroke());

    submit(&mut session, &client);
    assert_eq!(
        session.state(),
        SessionState::Succeeded {
            band: OutcomeBand::StrongMatch,
            score: 100.0
        }
    );

    let sent = client.transport().sent.borrow();
    let body = &sent[0].body;
    let png_magic = b"\x89PNG\r\n\x1a\n";
    let occurrences = body.windows(png_magic.len()).filter(|w| *w == png_magic.as_slice()).count();
    assert_eq!(occurrences, 2);
    assert!(String::from_utf8_lossy(body).contains("filename=\"drawn.png\""));
}

#[test]
fn late_response_after_input_change_is_discarded() {
    let client = VerificationClient::new(
        Recording::replying(vec![json(200, r#"{"match_score": 90}"#)]),
        &config(),
    );
    let mut session = both_uploaded();

    let SubmitAttempt::Started(pending) = session.begin_submit() else {
        panic!("submit should start");
    };
    session.select_file(Slot::Test, png_file("another.png"));

    let result = block_on(client.submit(pending.request));
    assert_eq!(session.complete(pending.generation, result), Completion::Discarded);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.snapshot().score, None);
}

#[test]
fn retry_after_timeout_then_change_input() {
    let client = VerificationClient::new(
        Recording::replying(vec![
            Err(TransportError::Timeout(std::time::Duration::from_secs(15))),
            json(200, r#"{"match_score": 30}"#),
        ]),
        &config(),
    );
    let mut session = both_uploaded();

    submit(&mut session, &client);
    assert_eq!(
        session.state(),
        SessionState::Failed {
            kind: ErrorKind::Timeout
        }
    );

    submit(&mut session, &client);
    assert_eq!(
        session.state(),
        SessionState::Succeeded {
            band: OutcomeBand::WeakOrNoMatch,
            score: 30.0
        }
    );

    session.clear_canvas(Slot::Test);
    assert_eq!(session.snapshot().score, Some(30.0), "clearing an upload slot is a no-op");
    session.remove_input(Slot::Test);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.snapshot().band, None);
    assert_eq!(client.transport().sent(), 2);
}

#[test]
fn observers_feed_the_comparison_log() {
    let client = VerificationClient::new(
        Recording::replying(vec![
            json(200, r#"{"match_score": 82}"#),
            json(503, "unavailable"),
        ]),
        &config(),
    );
    let log = std::rc::Rc::new(RefCell::new(ComparisonLog::default()));
    let mut session = Session::new(config()).unwrap();
    {
        let log = std::rc::Rc::clone(&log);
        session.observe(move |snapshot| {
            log.borrow_mut().record(snapshot);
        });
    }

    // Validation failure: not a comparison.
    submit(&mut session, &client);

    session.select_file(Slot::Original, png_file("a.png"));
    session.select_file(Slot::Test, png_file("b.png"));
    submit(&mut session, &client);
    session.select_file(Slot::Test, png_file("c.png"));
    submit(&mut session, &client);

    let summary = log.borrow().summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.match_rate, Some(100.0));
}
