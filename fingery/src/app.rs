use std::time::Duration;

use cadence::{
    Analysis, AnalysisRequest, AnalyticsProvider, Clock, Event, Origin, Session, provider,
};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{DefaultTerminal, Frame};
use tracing::{debug, error, info, warn};

use crate::config::{Config, EngineConfig};
use crate::error::AppError;
use crate::identity::{self, Identity};
use crate::remote::RemoteAnalytics;
use crate::report::{HistoryEntry, HistoryStore, Reporter, SessionReport};
use crate::view::{self, ViewContext};
use crate::words::{BuiltinWordSource, HttpWordSource, WordSource, WordSourceError};

/// How long to wait for a key before redrawing the live stats
const TICK: Duration = Duration::from_millis(100);

/// An app message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Quit the application
    Quit,
}

/// A finished session and its analytics
#[derive(Debug, Clone)]
pub struct Results {
    pub request: AnalysisRequest,
    pub analysis: Analysis,
    /// Dismissible warning shown above the stats
    pub notice: Option<String>,
}

/// What the user is looking at
#[derive(Debug, Clone)]
pub enum Screen {
    Typing(Session),
    Results(Box<Results>),
    /// No passage could be loaded
    Error(String),
}

/// Everything the app talks to besides the terminal
pub struct Services {
    pub words: Box<dyn WordSource>,
    pub remote: Option<Box<dyn AnalyticsProvider>>,
    pub reporter: Option<Reporter>,
    pub history: Option<HistoryStore>,
    pub identity: Option<Identity>,
}

impl Services {
    /// Wire up the services the settings ask for
    ///
    /// The remote analytics service and the reporting sink are only used by
    /// signed-in users with a server configured. `offline` turns off every
    /// network service.
    pub fn from_config(config: &Config, offline: bool) -> Result<Self, AppError> {
        let settings = &config.settings;
        let identity = settings.identity.resolve();
        let server = settings.server.url.as_deref().filter(|_| !offline);
        let timeout = settings.server.timeout_seconds;

        let words: Box<dyn WordSource> = match server {
            Some(url) => Box::new(HttpWordSource::new(url, timeout)),
            None => Box::new(BuiltinWordSource),
        };

        let signed_in = server.zip(identity.clone());

        let remote = signed_in
            .clone()
            .filter(|_| settings.analytics.remote)
            .map(|(url, identity)| {
                Box::new(RemoteAnalytics::new(url, timeout, Some(identity)))
                    as Box<dyn AnalyticsProvider>
            });

        let reporter = signed_in
            .filter(|_| settings.analytics.report)
            .map(|(url, identity)| Reporter::new(url, timeout, identity));

        let history = if settings.statistic.save_enabled {
            Some(HistoryStore::new(
                config.history_dir(),
                settings.statistic.history_limit,
            )?)
        } else {
            None
        };

        info!(
            words = words.name(),
            remote = remote.is_some(),
            report = reporter.is_some(),
            history = history.is_some(),
            user = identity::display_name(identity.as_ref()),
            "services ready"
        );

        Ok(Self {
            words,
            remote,
            reporter,
            history,
            identity,
        })
    }
}

/// The app itself
pub struct App<C: Clock> {
    clock: C,
    services: Services,
    engine: EngineConfig,
    word_count: usize,
    screen: Screen,
}

impl<C: Clock> App<C> {
    /// Creates a new `App` and loads the first passage
    pub fn new(clock: C, services: Services, engine: EngineConfig, word_count: usize) -> Self {
        let mut app = Self {
            clock,
            services,
            engine,
            word_count,
            screen: Screen::Error(String::new()),
        };
        app.new_passage();
        app
    }

    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Replace whatever is on screen with a fresh passage
    pub fn new_passage(&mut self) {
        let session = self
            .services
            .words
            .fetch(self.word_count)
            .and_then(|words| Session::new(words).ok_or(WordSourceError::EmptyOutput));

        self.screen = match session {
            Ok(session) => {
                debug!(words = session.word_count(), "new passage");
                Screen::Typing(session)
            }
            Err(error) => {
                error!(%error, "failed to load passage");
                Screen::Error(error.to_string())
            }
        };
    }

    /// Global key handler
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Message> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c' | 'q')).then_some(Message::Quit);
        }

        match self.screen {
            Screen::Typing(_) => self.handle_typing_key(key.code),
            Screen::Results(_) => return self.handle_results_key(key.code),
            Screen::Error(_) => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.new_passage(),
                KeyCode::Char('q') | KeyCode::Esc => return Some(Message::Quit),
                _ => {}
            },
        }

        None
    }

    fn handle_typing_key(&mut self, code: KeyCode) {
        if code == KeyCode::Esc {
            self.new_passage();
            return;
        }

        let Screen::Typing(session) = &self.screen else {
            return;
        };

        let mut text = session.input().to_string();
        match code {
            KeyCode::Char(char) => text.push(char),
            KeyCode::Backspace => {
                if text.pop().is_none() {
                    return;
                }
            }
            _ => return,
        }

        let session = session.clone().apply(Event::input(text, self.clock.now_ms()));

        if session.is_finished() {
            self.finish(&session);
        } else {
            self.screen = Screen::Typing(session);
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) -> Option<Message> {
        match code {
            KeyCode::Char('r') => self.retry(),
            KeyCode::Char('d') => {
                if let Screen::Results(results) = &mut self.screen {
                    results.notice = None;
                }
            }
            KeyCode::Char('n') | KeyCode::Enter | KeyCode::Esc => self.new_passage(),
            KeyCode::Char('q') => return Some(Message::Quit),
            _ => {}
        }
        None
    }

    /// Runs exactly once per finished session
    fn finish(&mut self, session: &Session) {
        let Some(request) = session.completion() else {
            return;
        };

        let analysis = self.analyze(&request);
        info!(
            wpm = analysis.record.wpm,
            accuracy = analysis.record.accuracy,
            origin = ?analysis.origin,
            "session finished"
        );

        if let Some(reporter) = &self.services.reporter {
            // Detached, results show right away
            reporter.submit(SessionReport::new(&request, &analysis));
        }

        if let Some(history) = &self.services.history {
            let entry = HistoryEntry::new(
                self.clock.now_ms(),
                identity::display_name(self.services.identity.as_ref()),
                &request,
                &analysis,
            );
            if let Err(error) = history.save(&entry) {
                warn!(%error, "failed to save session");
            }
        }

        self.screen = Screen::Results(Box::new(Results {
            notice: notice(&analysis),
            request,
            analysis,
        }));
    }

    /// Ask the remote service again after a fallback
    pub fn retry(&mut self) {
        let Screen::Results(results) = &self.screen else {
            return;
        };
        if !results.analysis.is_fallback() {
            return;
        }

        let analysis = self.analyze(&results.request);
        let request = results.request.clone();
        info!(origin = ?analysis.origin, "retried analytics");

        self.screen = Screen::Results(Box::new(Results {
            notice: notice(&analysis),
            request,
            analysis,
        }));
    }

    fn analyze(&self, request: &AnalysisRequest) -> Analysis {
        let analysis = provider::analyze(
            request,
            self.services.remote.as_deref(),
            self.engine.bins,
            &self.engine.analytics(),
        );

        if let Some(error) = &analysis.fallback {
            warn!(%error, "falling back to local analytics");
        }

        analysis
    }

    fn view_context(&self) -> ViewContext<'_> {
        ViewContext {
            now_ms: self.clock.now_ms(),
            user: identity::display_name(self.services.identity.as_ref()),
            analytics: self.engine.analytics(),
        }
    }

    /// Draw the current screen
    pub fn draw(&self, frame: &mut Frame) {
        view::draw(frame, &self.screen, &self.view_context());
    }

    /// Runs the app until the user quits
    pub fn run(&mut self) -> Result<(), AppError> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<(), AppError> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if !event::poll(TICK)? {
                continue;
            }

            let message = match event::read()? {
                TermEvent::Key(key) => self.handle_key(key),
                _ => None,
            };

            if message == Some(Message::Quit) {
                break;
            }
        }

        Ok(())
    }
}

fn notice(analysis: &Analysis) -> Option<String> {
    analysis.fallback.as_ref().map(ToString::to_string)
}

impl Results {
    pub const fn is_remote(&self) -> bool {
        matches!(self.analysis.origin, Origin::Remote)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use cadence::{AnalyticsRecord, ManualClock, ProviderError};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    struct FixedWords(Vec<&'static str>);

    impl WordSource for FixedWords {
        fn fetch(&self, _count: usize) -> Result<Vec<String>, WordSourceError> {
            if self.0.is_empty() {
                return Err(WordSourceError::EmptyOutput);
            }
            Ok(self.0.iter().map(ToString::to_string).collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Fails until `succeed` is set, counting calls
    struct FlakyRemote {
        calls: Rc<Cell<usize>>,
        succeed: Rc<Cell<bool>>,
    }

    impl AnalyticsProvider for FlakyRemote {
        fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalyticsRecord, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            if self.succeed.get() {
                Ok(AnalyticsRecord {
                    wpm: 99,
                    ..cadence::compute("cat dog", "cat dog", 0, 6000)
                })
            } else {
                Err(ProviderError::Unavailable("timed out".into()))
            }
        }
    }

    fn services(words: Vec<&'static str>) -> Services {
        Services {
            words: Box::new(FixedWords(words)),
            remote: None,
            reporter: None,
            history: None,
            identity: None,
        }
    }

    fn app(services: Services) -> App<ManualClock> {
        App::new(ManualClock::new(0), services, EngineConfig::default(), 2)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Type `text`, advancing the clock by `interval` after each key
    fn type_text(app: &mut App<ManualClock>, text: &str, interval: u64) {
        for char in text.chars() {
            app.handle_key(press(KeyCode::Char(char)));
            app.clock.advance(interval);
        }
    }

    fn results(app: &App<ManualClock>) -> &Results {
        match app.screen() {
            Screen::Results(results) => results,
            other => panic!("expected results, got {other:?}"),
        }
    }

    #[test]
    fn test_typing_to_completion() {
        let mut app = app(services(vec!["cat", "dog"]));
        type_text(&mut app, "cat dog", 1000);

        let results = results(&app);
        // First key at 0ms, last at 6000ms
        assert_eq!(results.analysis.record.wpm, 20);
        assert_eq!(results.analysis.record.accuracy, 100);
        assert_eq!(results.analysis.series.len(), EngineConfig::default().bins);
        assert_eq!(results.analysis.origin, Origin::Local);
        assert!(results.notice.is_none());
        assert_eq!(results.request.sample_trace.len(), 7);
    }

    #[test]
    fn test_backspace() {
        let mut app = app(services(vec!["cat"]));
        type_text(&mut app, "cx", 100);
        app.handle_key(press(KeyCode::Backspace));

        let Screen::Typing(session) = app.screen() else {
            panic!("still typing");
        };
        assert_eq!(session.input(), "c");
        assert_eq!(session.trace().len(), 3);

        type_text(&mut app, "at", 100);
        assert_eq!(results(&app).analysis.record.incorrect_chars, 0);
    }

    #[test]
    fn test_backspace_on_empty_input_is_ignored() {
        let mut app = app(services(vec!["cat"]));
        app.handle_key(press(KeyCode::Backspace));

        let Screen::Typing(session) = app.screen() else {
            panic!("still typing");
        };
        assert!(!session.has_started());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(services(vec!["cat"]));
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Message::Quit)
        );
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Message::Quit)
        );
        // Plain `q` is just a typo while typing
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), None);
    }

    #[test]
    fn test_escape_restarts() {
        let mut app = app(services(vec!["cat"]));
        type_text(&mut app, "ca", 100);
        app.handle_key(press(KeyCode::Esc));

        let Screen::Typing(session) = app.screen() else {
            panic!("still typing");
        };
        assert_eq!(session.input(), "");
        assert!(!session.has_started());
    }

    #[test]
    fn test_word_source_failure() {
        let mut app = app(services(vec![]));
        assert!(matches!(app.screen(), Screen::Error(_)));
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), Some(Message::Quit));
    }

    #[test]
    fn test_remote_fallback_and_retry() {
        let calls = Rc::new(Cell::new(0));
        let succeed = Rc::new(Cell::new(false));
        let mut services = services(vec!["cat", "dog"]);
        services.remote = Some(Box::new(FlakyRemote {
            calls: Rc::clone(&calls),
            succeed: Rc::clone(&succeed),
        }));

        let mut app = app(services);
        type_text(&mut app, "cat dog", 1000);

        let first = results(&app);
        assert_eq!(calls.get(), 1);
        assert_eq!(first.analysis.origin, Origin::Local);
        assert_eq!(first.analysis.record.wpm, 20);
        assert_eq!(
            first.notice.as_deref(),
            Some("Analytics service unavailable: timed out")
        );

        succeed.set(true);
        app.handle_key(press(KeyCode::Char('r')));

        let retried = results(&app);
        assert_eq!(calls.get(), 2);
        assert!(retried.is_remote());
        assert_eq!(retried.analysis.record.wpm, 99);
        assert!(retried.notice.is_none());

        // Nothing left to retry
        app.handle_key(press(KeyCode::Char('r')));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_dismiss_notice() {
        let mut services = services(vec!["cat"]);
        services.remote = Some(Box::new(FlakyRemote {
            calls: Rc::new(Cell::new(0)),
            succeed: Rc::new(Cell::new(false)),
        }));

        let mut app = app(services);
        type_text(&mut app, "cat", 500);
        assert!(results(&app).notice.is_some());

        app.handle_key(press(KeyCode::Char('d')));
        assert!(results(&app).notice.is_none());
        assert!(results(&app).analysis.is_fallback());

        app.handle_key(press(KeyCode::Char('n')));
        assert!(matches!(app.screen(), Screen::Typing(_)));
    }

    #[test]
    fn test_history_saved_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = services(vec!["cat"]);
        services.history = Some(HistoryStore::new(dir.path().to_path_buf(), 0).unwrap());

        let mut app = app(services);
        type_text(&mut app, "cat", 500);
        // Keys after completion do not finish it again
        app.handle_key(press(KeyCode::Char('x')));

        let store = HistoryStore::new(dir.path().to_path_buf(), 0).unwrap();
        let entries = store.load_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user, "guest");
        assert_eq!(entries[0].input_text, "cat");
    }

    #[test]
    fn test_draw() {
        let rendered = |app: &App<ManualClock>| {
            let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
            terminal.draw(|frame| app.draw(frame)).unwrap();
            let buffer = terminal.backend().buffer();
            buffer.content.iter().map(|cell| cell.symbol()).collect::<String>()
        };

        let mut app = app(services(vec!["cat"]));
        assert!(rendered(&app).contains("guest"));

        type_text(&mut app, "cat", 500);
        assert!(rendered(&app).contains("Summary"));
    }
}
