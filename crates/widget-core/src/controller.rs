use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::WidgetConfig;
use crate::events::{Visibility, WidgetEvent, WidgetSnapshot};
use crate::message::{ConversationLog, Message};
use crate::timer::{Clock, ReplyQueue, ScheduledReply, SystemClock};

/// Key name that commits the pending input.
pub const COMMIT_KEY: &str = "enter";

/// Behavior knobs copied out of [`WidgetConfig`] at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerPolicy {
    pub reply_delay: Duration,
    pub clear_on_close: bool,
    pub greeting: String,
    pub acknowledgement: String,
}

impl From<&WidgetConfig> for ControllerPolicy {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            reply_delay: config.reply_delay(),
            clear_on_close: config.clear_on_close,
            greeting: config.greeting.clone(),
            acknowledgement: config.acknowledgement.clone(),
        }
    }
}

impl Default for ControllerPolicy {
    fn default() -> Self {
        Self::from(&WidgetConfig::default())
    }
}

/// Owns visibility, transcript, pending input and reply timers for one widget.
///
/// Every mutation publishes a fresh [`WidgetSnapshot`] on a watch channel and
/// queues [`WidgetEvent`]s for [`WidgetController::drain_events`].
pub struct WidgetController {
    policy: ControllerPolicy,
    visibility: Visibility,
    log: ConversationLog,
    pending_input: String,
    /// Cleared only when closing discards the transcript.
    greeted: bool,
    replies: ReplyQueue,
    events: Vec<WidgetEvent>,
    snapshot_tx: watch::Sender<WidgetSnapshot>,
}

impl WidgetController {
    pub fn new(policy: ControllerPolicy, clock: Arc<dyn Clock>) -> Self {
        let (snapshot_tx, _) = watch::channel(WidgetSnapshot::default());
        Self {
            policy,
            visibility: Visibility::Closed,
            log: ConversationLog::new(),
            pending_input: String::new(),
            greeted: false,
            replies: ReplyQueue::new(clock),
            events: Vec::new(),
            snapshot_tx,
        }
    }

    /// Controller on the wall clock, configured from `config`.
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self::new(ControllerPolicy::from(config), Arc::new(SystemClock::new()))
    }

    pub fn policy(&self) -> &ControllerPolicy {
        &self.policy
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn messages(&self) -> &[Message] {
        self.log.as_slice()
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    pub fn open(&mut self) {
        if self.visibility.is_open() {
            return;
        }

        self.visibility = Visibility::Open;
        self.events.push(WidgetEvent::Opened);
        if self.log.is_empty() {
            self.seed_greeting();
        }
        tracing::debug!(messages = self.log.len(), "chat widget opened");
        self.publish();
    }

    pub fn close(&mut self) {
        if !self.visibility.is_open() {
            return;
        }

        self.visibility = Visibility::Closed;
        self.events.push(WidgetEvent::Closed);
        if self.policy.clear_on_close {
            self.clear_log();
            self.greeted = false;
        }
        tracing::debug!(messages = self.log.len(), "chat widget closed");
        self.publish();
    }

    pub fn toggle(&mut self) {
        if self.visibility.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Empties the transcript without touching visibility.
    pub fn reset(&mut self) {
        if self.log.is_empty() {
            return;
        }
        self.clear_log();
        self.publish();
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.pending_input {
            return;
        }
        self.pending_input = text;
        self.events.push(WidgetEvent::InputChanged);
        self.publish();
    }

    /// Sends the pending input and schedules one acknowledgement.
    ///
    /// Returns `None` without side effects when the input is blank.
    pub fn send(&mut self) -> Option<ScheduledReply> {
        if self.pending_input.trim().is_empty() {
            return None;
        }

        if !self.greeted {
            self.seed_greeting();
        }
        let text = std::mem::take(&mut self.pending_input);
        self.append(Message::user(text));
        self.events.push(WidgetEvent::InputChanged);

        let scheduled = self.replies.schedule(self.policy.reply_delay);
        self.events.push(WidgetEvent::ReplyScheduled {
            id: scheduled.id,
            due_in: scheduled.delay,
        });
        tracing::debug!(
            reply = scheduled.id.0,
            delay_ms = scheduled.delay.as_millis() as u64,
            "scheduled acknowledgement"
        );
        self.publish();
        Some(scheduled)
    }

    pub fn on_key_commit(&mut self, key: &str) -> Option<ScheduledReply> {
        if key.eq_ignore_ascii_case(COMMIT_KEY) {
            self.send()
        } else {
            None
        }
    }

    /// Appends the fixed acknowledgement.
    pub fn on_reply_timer(&mut self) {
        let reply = Message::system(self.policy.acknowledgement.clone());
        self.append(reply);
        self.publish();
    }

    /// Fires every reply whose deadline has passed and returns how many fired.
    pub fn fire_due_replies(&mut self) -> usize {
        let due = self.replies.take_due();
        for id in &due {
            tracing::debug!(reply = id.0, "reply timer fired");
            self.on_reply_timer();
        }
        due.len()
    }

    pub fn next_reply_due_in(&self) -> Option<Duration> {
        self.replies.next_due_in()
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            visibility: self.visibility,
            messages: self.log.as_slice().to_vec(),
            pending_input: self.pending_input.clone(),
            pending_replies: self.replies.len(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
        self.publish();
        self.snapshot_tx.subscribe()
    }

    pub fn drain_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    fn seed_greeting(&mut self) {
        let greeting = Message::system(self.policy.greeting.clone());
        self.append(greeting);
        self.greeted = true;
    }

    fn append(&mut self, message: Message) {
        let author = message.author;
        let index = self.log.push(message);
        self.events.push(WidgetEvent::MessageAppended { index, author });
        self.events.push(WidgetEvent::ScrollToLatest {
            len: self.log.len(),
        });
    }

    fn clear_log(&mut self) {
        if self.log.is_empty() {
            return;
        }
        self.log.clear();
        self.events.push(WidgetEvent::LogCleared);
        self.events.push(WidgetEvent::ScrollToLatest { len: 0 });
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Author, DEFAULT_ACKNOWLEDGEMENT, DEFAULT_GREETING};
    use crate::timer::ManualClock;

    const DELAY: Duration = Duration::from_millis(1000);

    fn controller(clear_on_close: bool) -> (ManualClock, WidgetController) {
        let clock = ManualClock::new();
        let policy = ControllerPolicy {
            clear_on_close,
            ..ControllerPolicy::default()
        };
        let controller = WidgetController::new(policy, Arc::new(clock.clone()));
        (clock, controller)
    }

    fn texts(controller: &WidgetController) -> Vec<&str> {
        controller
            .messages()
            .iter()
            .map(|message| message.text.as_str())
            .collect()
    }

    #[test]
    fn starts_closed_and_empty() {
        let (_, controller) = controller(false);
        assert_eq!(controller.visibility(), Visibility::Closed);
        assert!(controller.log().is_empty());
        assert_eq!(controller.pending_input(), "");
    }

    #[test]
    fn open_seeds_a_single_greeting() {
        let (_, mut controller) = controller(false);
        controller.open();
        controller.open();

        assert!(controller.is_open());
        assert_eq!(texts(&controller), vec![DEFAULT_GREETING]);
        assert_eq!(controller.messages()[0].author, Author::System);
    }

    #[test]
    fn sending_before_the_first_open_keeps_the_greeting_first() {
        let (_, mut controller) = controller(false);
        controller.update_input("early");
        controller.send();
        controller.open();

        assert_eq!(texts(&controller), vec![DEFAULT_GREETING, "early"]);
        assert_eq!(controller.messages()[0].author, Author::System);
    }

    #[test]
    fn reset_transcript_stays_empty_until_reopened() {
        let (_, mut controller) = controller(false);
        controller.open();
        controller.reset();
        controller.update_input("after reset");
        controller.send();
        assert_eq!(texts(&controller), vec!["after reset"]);
    }

    #[test]
    fn discarded_transcript_is_greeted_again() {
        let (_, mut controller) = controller(true);
        controller.open();
        controller.close();
        controller.update_input("closed");
        controller.send();
        assert_eq!(texts(&controller), vec![DEFAULT_GREETING, "closed"]);
    }

    #[test]
    fn blank_input_is_ignored_and_left_in_place() {
        let (clock, mut controller) = controller(false);
        controller.open();

        for blank in ["", " ", "\t\n", "   \r\n  "] {
            controller.update_input(blank);
            assert_eq!(controller.send(), None);
            assert_eq!(controller.log().len(), 1);
            assert_eq!(controller.pending_input(), blank);
        }

        clock.advance(DELAY * 5);
        assert_eq!(controller.fire_due_replies(), 0);
        assert_eq!(controller.log().len(), 1);
    }

    #[test]
    fn send_appends_untrimmed_text_and_replies_after_delay() {
        let (clock, mut controller) = controller(false);
        controller.open();
        controller.update_input("  hello there ");

        let scheduled = controller.send().expect("non-blank input schedules a reply");
        assert_eq!(scheduled.delay, DELAY);
        assert_eq!(controller.log().len(), 2);
        assert_eq!(controller.messages()[1], Message::user("  hello there "));
        assert_eq!(controller.pending_input(), "");
        assert_eq!(controller.pending_replies(), 1);

        clock.advance(DELAY - Duration::from_millis(1));
        assert_eq!(controller.fire_due_replies(), 0);
        assert_eq!(controller.log().len(), 2);

        clock.advance(Duration::from_millis(1));
        assert_eq!(controller.fire_due_replies(), 1);
        assert_eq!(
            texts(&controller),
            vec![DEFAULT_GREETING, "  hello there ", DEFAULT_ACKNOWLEDGEMENT]
        );
        assert_eq!(controller.fire_due_replies(), 0);
    }

    #[test]
    fn every_send_gets_its_own_reply() {
        let (clock, mut controller) = controller(false);
        controller.open();
        for text in ["one", "two", "three"] {
            controller.update_input(text);
            controller.send();
            clock.advance(Duration::from_millis(100));
        }

        assert_eq!(controller.pending_replies(), 3);
        assert_eq!(controller.next_reply_due_in(), Some(Duration::from_millis(700)));

        clock.advance(DELAY);
        assert_eq!(controller.fire_due_replies(), 3);
        let replies = controller
            .messages()
            .iter()
            .filter(|message| message.text == DEFAULT_ACKNOWLEDGEMENT)
            .count();
        assert_eq!(replies, 3);
    }

    #[test]
    fn modal_close_keeps_the_transcript() {
        let (clock, mut controller) = controller(false);
        controller.open();
        controller.update_input("hi");
        controller.send();
        controller.close();
        controller.open();

        assert_eq!(texts(&controller), vec![DEFAULT_GREETING, "hi"]);

        clock.advance(DELAY);
        controller.fire_due_replies();
        assert_eq!(
            texts(&controller),
            vec![DEFAULT_GREETING, "hi", DEFAULT_ACKNOWLEDGEMENT]
        );
    }

    #[test]
    fn popover_close_discards_the_transcript() {
        let (_, mut controller) = controller(true);
        controller.open();
        controller.update_input("hi");
        controller.send();
        controller.close();
        assert!(controller.log().is_empty());

        controller.open();
        assert_eq!(texts(&controller), vec![DEFAULT_GREETING]);
    }

    #[test]
    fn reply_scheduled_before_close_lands_in_the_current_log() {
        let (clock, mut controller) = controller(true);
        controller.open();
        controller.update_input("hi");
        controller.send();
        controller.close();
        controller.open();

        clock.advance(DELAY);
        assert_eq!(controller.fire_due_replies(), 1);
        assert_eq!(
            texts(&controller),
            vec![DEFAULT_GREETING, DEFAULT_ACKNOWLEDGEMENT]
        );
    }

    #[test]
    fn only_the_commit_key_sends() {
        let (_, mut controller) = controller(false);
        controller.open();
        controller.update_input("hey");

        assert_eq!(controller.on_key_commit("a"), None);
        assert_eq!(controller.on_key_commit("shift"), None);
        assert_eq!(controller.log().len(), 1);

        assert!(controller.on_key_commit("Enter").is_some());
        assert_eq!(controller.log().len(), 2);

        assert_eq!(controller.on_key_commit("enter"), None);
        assert_eq!(controller.log().len(), 2);
    }

    #[test]
    fn log_length_changes_emit_scroll_cues() {
        let (clock, mut controller) = controller(true);
        controller.open();
        controller.update_input("hi");
        controller.send();
        clock.advance(DELAY);
        controller.fire_due_replies();
        controller.close();

        let cues = controller
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                WidgetEvent::ScrollToLatest { len } => Some(len),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(cues, vec![1, 2, 3, 0]);
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn input_edits_do_not_emit_scroll_cues() {
        let (_, mut controller) = controller(false);
        controller.update_input("draft");
        controller.update_input("draft");

        assert_eq!(controller.drain_events(), vec![WidgetEvent::InputChanged]);
    }

    #[test]
    fn toggle_and_reset() {
        let (_, mut controller) = controller(false);
        controller.toggle();
        assert!(controller.is_open());

        controller.reset();
        assert!(controller.is_open());
        assert!(controller.log().is_empty());

        controller.toggle();
        controller.toggle();
        assert_eq!(texts(&controller), vec![DEFAULT_GREETING]);
    }

    #[tokio::test]
    async fn subscribers_observe_each_mutation() {
        let (_, mut controller) = controller(false);
        let mut snapshots = controller.subscribe();
        assert_eq!(*snapshots.borrow_and_update(), WidgetSnapshot::default());

        controller.open();
        snapshots.changed().await.unwrap();
        {
            let snapshot = snapshots.borrow_and_update();
            assert!(snapshot.is_open());
            assert_eq!(snapshot.messages.len(), 1);
            assert!(!snapshot.can_send());
        }

        controller.update_input("typed");
        snapshots.changed().await.unwrap();
        let snapshot = snapshots.borrow_and_update().clone();
        assert_eq!(snapshot.pending_input, "typed");
        assert!(snapshot.can_send());
    }
}
