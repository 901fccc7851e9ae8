use pinnote_core::db::open_db_in_memory;
use pinnote_core::{
    GateState, PinService, PinSettingsSession, PreferenceFeed, PreferenceRepository,
    SessionEvent, SqlitePreferenceRepository,
};
use rusqlite::Connection;

type Session<'conn> = PinSettingsSession<SqlitePreferenceRepository<'conn>>;

struct Fixture {
    conn: Connection,
    prefs: PreferenceFeed,
}

impl Fixture {
    fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
            prefs: PreferenceFeed::new(),
        }
    }

    fn repo(&self) -> SqlitePreferenceRepository<'_> {
        SqlitePreferenceRepository::try_new(&self.conn, self.prefs.clone()).unwrap()
    }

    fn session(&self) -> Session<'_> {
        PinSettingsSession::new(PinService::new(self.repo())).unwrap()
    }

    fn with_pin(self, pin: &str) -> Self {
        self.repo().save_pin_setup(pin, "First pet?", "Rex").unwrap();
        self
    }
}

fn fill(session: &mut Session<'_>, old: &str, new: &str) {
    session.set_old_pin(old);
    session.set_new_pin(new);
    session.set_confirm_pin(new);
    session.set_question("First pet?");
    session.set_answer("Rex");
}

fn messages(events: &[SessionEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::ShowMessage { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

fn count_saved(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|event| **event == SessionEvent::SettingsSaved)
        .count()
}

#[test]
fn first_setup_saves_pin_and_leaves() {
    let fx = Fixture::new();
    let mut session = fx.session();
    assert!(!session.state().has_pin);
    assert_eq!(session.gate_state(), GateState::NoPin);

    fill(&mut session, "", "1234");
    assert!(session.submit().unwrap());

    let state = session.state();
    assert!(state.has_pin);
    assert!(state.has_security_question);
    assert_eq!(state.form.new_pin, "");
    assert_eq!(session.gate_state(), GateState::Locked);

    let events = session.drain_events();
    assert_eq!(
        messages(&events),
        vec!["PIN and security question updated successfully!"]
    );
    assert_eq!(count_saved(&events), 1);

    let creds = fx.repo().load_credentials().unwrap();
    assert_eq!(creds.pin.as_deref(), Some("1234"));
    assert_eq!(creds.security_answer.as_deref(), Some("Rex"));
}

#[test]
fn empty_form_flags_every_field_at_once() {
    let fx = Fixture::new();
    let mut session = fx.session();

    assert!(!session.submit().unwrap());
    let errors = session.state().errors;
    assert!(!errors.old_pin);
    assert!(errors.new_pin);
    assert!(errors.confirm_pin);
    assert!(errors.question);
    assert!(errors.answer);
    assert_eq!(
        messages(&session.drain_events()),
        vec!["Please fill in all fields and make sure the PINs match."]
    );
    assert!(!fx.repo().load_credentials().unwrap().has_pin());
}

#[test]
fn editing_a_field_clears_its_flag() {
    let fx = Fixture::new();
    let mut session = fx.session();
    session.submit().unwrap();

    session.set_new_pin("9");
    let errors = session.state().errors;
    assert!(!errors.new_pin);
    assert!(!errors.confirm_pin);
    assert!(errors.question);

    session.set_question("q");
    assert!(!session.state().errors.question);
}

#[test]
fn changing_pin_requires_correct_old_pin() {
    let fx = Fixture::new().with_pin("1234");
    let mut session = fx.session();

    fill(&mut session, "1111", "5678");
    assert!(!session.submit().unwrap());
    assert!(session.state().errors.old_pin);
    assert_eq!(
        messages(&session.drain_events()),
        vec!["Old PIN is wrong or empty!"]
    );
    assert_eq!(
        fx.repo().load_credentials().unwrap().pin.as_deref(),
        Some("1234")
    );

    session.set_old_pin("1234");
    assert!(session.submit().unwrap());
    assert_eq!(
        fx.repo().load_credentials().unwrap().pin.as_deref(),
        Some("5678")
    );
}

#[test]
fn reset_requires_security_question() {
    let fx = Fixture::new();
    let mut session = fx.session();

    session.open_reset_dialog().unwrap();
    assert!(session.state().reset_dialog.is_none());
    assert_eq!(
        messages(&session.drain_events()),
        vec!["Set a security question before resetting the PIN!"]
    );
}

#[test]
fn wrong_reset_answer_keeps_pin() {
    let fx = Fixture::new().with_pin("1234");
    let mut session = fx.session();

    session.open_reset_dialog().unwrap();
    assert_eq!(session.gate_state(), GateState::AwaitingResetAnswer);
    assert_eq!(
        session.state().reset_dialog.as_ref().unwrap().question,
        "First pet?"
    );

    session.set_reset_answer("rex");
    assert!(!session.confirm_reset().unwrap());
    assert!(session.state().reset_dialog.as_ref().unwrap().error);
    assert_eq!(
        messages(&session.drain_events()),
        vec!["Wrong answer or no security question set!"]
    );
    assert!(fx.repo().load_credentials().unwrap().has_pin());

    session.set_reset_answer(" Rex ");
    assert!(!session.state().reset_dialog.as_ref().unwrap().error);
}

#[test]
fn reset_then_forced_setup_after_answer_verification() {
    let fx = Fixture::new().with_pin("1234");
    let mut session = fx.session();

    session.open_reset_dialog().unwrap();
    session.set_reset_answer("Rex");
    assert!(session.confirm_reset().unwrap());
    assert!(session.state().reset_dialog.is_none());
    assert!(!session.state().has_pin);
    assert!(session.state().is_force_setup);
    assert!(session.state().has_security_question);
    assert_eq!(session.state().setup_question.as_deref(), Some("First pet?"));
    assert_eq!(session.gate_state(), GateState::ResetPending);
    assert_eq!(
        messages(&session.drain_events()),
        vec!["PIN reset. Verify your security question to set a new PIN."]
    );

    fill(&mut session, "", "2468");
    assert!(!session.submit().unwrap());
    assert_eq!(
        messages(&session.drain_events()),
        vec!["Verify your security question before setting a new PIN."]
    );

    session.set_setup_answer("wrong");
    assert!(!session.verify_setup_answer().unwrap());
    assert!(session.state().setup_answer_error);
    assert_eq!(
        messages(&session.drain_events()),
        vec!["Wrong security answer or no security question set!"]
    );

    session.set_setup_answer("Rex");
    assert!(!session.state().setup_answer_error);
    assert!(session.verify_setup_answer().unwrap());
    assert!(session.state().security_question_verified);
    assert!(session.state().setup_question.is_none());
    assert_eq!(session.gate_state(), GateState::NoPin);

    assert!(session.submit().unwrap());
    let creds = fx.repo().load_credentials().unwrap();
    assert_eq!(creds.pin.as_deref(), Some("2468"));
    assert!(!creds.force_setup_after_reset);
    assert!(!session.state().is_force_setup);
    assert_eq!(count_saved(&session.drain_events()), 1);
}

#[test]
fn back_navigation_blocked_until_reset_is_resolved() {
    let fx = Fixture::new().with_pin("1234");
    let mut session = fx.session();
    session.open_reset_dialog().unwrap();
    session.set_reset_answer("Rex");
    session.confirm_reset().unwrap();
    session.drain_events();

    assert!(!session.request_navigate_back());
    let events = session.drain_events();
    assert_eq!(
        messages(&events),
        vec!["Set a new PIN before leaving this screen."]
    );
    assert_eq!(count_saved(&events), 0);

    session.set_setup_answer("Rex");
    session.verify_setup_answer().unwrap();
    assert!(session.request_navigate_back());
    assert_eq!(count_saved(&session.drain_events()), 1);
}

#[test]
fn settings_saved_is_emitted_once() {
    let fx = Fixture::new();
    let mut session = fx.session();

    fill(&mut session, "", "1234");
    assert!(session.submit().unwrap());
    assert!(session.request_navigate_back());
    assert_eq!(count_saved(&session.drain_events()), 1);
}

#[test]
fn dismissing_reset_dialog_restores_gate_state() {
    let fx = Fixture::new().with_pin("1234");
    let mut session = fx.session();

    session.open_reset_dialog().unwrap();
    session.dismiss_reset_dialog();
    assert!(session.state().reset_dialog.is_none());
    assert_eq!(session.gate_state(), GateState::Locked);
}

#[test]
fn external_pin_change_is_observed() {
    let fx = Fixture::new();
    let mut session = fx.session();
    assert!(!session.state().has_pin);

    fx.repo().save_pin_setup("7777", "q", "a").unwrap();
    assert!(session.poll());
    assert!(session.state().has_pin);
    assert!(!session.poll());
}
