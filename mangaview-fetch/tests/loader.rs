use std::collections::HashMap;
use std::io::Cursor;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mangaview_core::{
    LoadState, Location, MemoryStore, PageSource, PreferenceStore, ReaderEvent, ReaderSession,
    SessionStatus,
};
use mangaview_fetch::{spawn_loader, FetchError, HttpClient, Loader, MangaDexClient};

const API: &str = "https://api.test";

#[derive(Default)]
struct MockHttp {
    responses: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl MockHttp {
    fn json(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }

    fn png(mut self, url: &str, width: u32, height: u32) -> Self {
        let mut out = Cursor::new(Vec::new());
        image::RgbImage::new(width, height)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        self.responses.insert(url.to_string(), out.into_inner());
        self
    }

    fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.starts_with(prefix))
            .count()
    }
}

impl HttpClient for MockHttp {
    fn get(&self, url: &str) -> mangaview_fetch::Result<Vec<u8>> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses.get(url).cloned().ok_or(FetchError::Status {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Work `w` with chapters 1 (`c1`, five pages) and 2 (`c2`). Page 2 of c1 is missing.
fn server() -> MockHttp {
    MockHttp::default()
        .json(
            "https://api.test/chapter/c1",
            r#"{"data":{"id":"c1","attributes":{"chapter":"1","pages":5}}}"#,
        )
        .json(
            "https://api.test/at-home/server/c1",
            r#"{"baseUrl":"https://img.test","chapter":{"hash":"h1","data":["1.png","2.png","3.png","4.png","5.png"]}}"#,
        )
        .json(
            "https://api.test/manga/w/feed?limit=500&offset=0",
            r#"{"data":[
                {"id":"c2","attributes":{"chapter":"2","pages":3}},
                {"id":"c1","attributes":{"chapter":"1","pages":5}}
            ]}"#,
        )
        .png("https://img.test/data/h1/1.png", 40, 60)
        .png("https://img.test/data/h1/3.png", 41, 61)
        .png("https://img.test/data/h1/4.png", 42, 62)
        .png("https://img.test/data/h1/5.png", 43, 63)
}

type Session = ReaderSession<Loader<MockHttp, MangaDexClient<MockHttp>>, MemoryStore>;

fn open(http: Arc<MockHttp>) -> (Session, Receiver<ReaderEvent>) {
    let api = Arc::new(MangaDexClient::new(Arc::clone(&http), API));
    let (loader, rx) = spawn_loader(http, api, 2).unwrap();
    let location: Location = "w/1?chapter=c1".parse().unwrap();
    let mut session = ReaderSession::new(
        &location,
        PreferenceStore::open(MemoryStore::new()),
        loader,
        (),
    );
    session.open();
    (session, rx)
}

/// Feed events into the session until `done` holds.
fn pump_until(session: &mut Session, rx: &Receiver<ReaderEvent>, done: impl Fn(&Session) -> bool) {
    while !done(session) {
        let event = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("loader went quiet");
        session.handle(event, Instant::now());
    }
}

fn settled(session: &Session, indices: &[usize]) -> bool {
    indices.iter().all(|&i| {
        session
            .registry()
            .get(i)
            .is_some_and(|p| p.load_state.is_terminal())
    })
}

#[test]
fn chapter_resolves_and_window_loads() {
    let http = Arc::new(server());
    let (mut session, rx) = open(Arc::clone(&http));

    pump_until(&mut session, &rx, |s| s.status() == SessionStatus::Ready);
    assert_eq!(session.registry().len(), 5);
    assert_eq!(session.engine().chapters().len(), 2);

    pump_until(&mut session, &rx, |s| settled(s, &[0, 1, 2]));
    let registry = session.registry();
    assert_eq!(registry.get(0).unwrap().dimensions(), Some((40, 60)));
    assert_eq!(registry.get(1).unwrap().load_state, LoadState::Failed);
    assert_eq!(registry.get(2).unwrap().dimensions(), Some((41, 61)));
    assert_eq!(registry.get(3).unwrap().load_state, LoadState::Unloaded);
    assert_eq!(http.calls_to("https://img.test/"), 3);
}

#[test]
fn unknown_chapter_reports_failure() {
    let http = Arc::new(server());
    let api = Arc::new(MangaDexClient::new(Arc::clone(&http), API));
    let (loader, rx) = spawn_loader(http, api, 1).unwrap();
    let location: Location = "w/1?chapter=missing".parse().unwrap();
    let mut session =
        ReaderSession::new(&location, PreferenceStore::open(MemoryStore::new()), loader, ());
    session.open();

    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(
        &event,
        ReaderEvent::ChapterResolved { result: Err(_), .. }
    ));
    session.handle(event, Instant::now());
    assert_eq!(session.status(), SessionStatus::Loading);
    assert_eq!(session.take_notifications(), ["Failed to load chapter"]);
}

#[test]
fn sender_shares_the_event_channel() {
    let http = Arc::new(MockHttp::default());
    let api = Arc::new(MangaDexClient::new(Arc::clone(&http), API));
    let (loader, rx) = spawn_loader(http, api, 1).unwrap();

    loader.sender().send(ReaderEvent::Shutdown).unwrap();
    assert_eq!(rx.recv().unwrap(), ReaderEvent::Shutdown);

    loader.request_page(mangaview_core::PageRequest {
        generation: 3,
        index: 0,
        url: "https://img.test/none.png".into(),
    });
    match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
        ReaderEvent::PageFetched(done) => {
            assert_eq!(done.generation, 3);
            assert!(matches!(
                done.result,
                mangaview_core::PageResult::Failed { .. }
            ));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
