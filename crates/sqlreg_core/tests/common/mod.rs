#![allow(dead_code)]

use parking_lot::Mutex;
use rusqlite::Connection;
use sqlreg_core::{
    FailurePolicy, InjectedFailure, Level, Member, MemberRepository, Notifier, NotifyError,
    SqliteMemberRepository, ThresholdPolicy,
};

pub const MIN_LOGINS_FOR_SILVER: u32 = ThresholdPolicy::DEFAULT_MIN_LOGINS_FOR_SILVER;
pub const MIN_RECOMMENDS_FOR_GOLD: u32 = ThresholdPolicy::DEFAULT_MIN_RECOMMENDS_FOR_GOLD;

/// Five members; `joytouch` and `madnite1` are eligible.
///
/// The batch walks members in id order (bumjin, erwins, green, joytouch,
/// madnite1), so the eligible ones are processed 4th and 5th.
pub fn fixture_members() -> Vec<Member> {
    vec![
        Member::new("bumjin", "Park Bumjin", "p1", "bumjin@example.com")
            .with_counts(MIN_LOGINS_FOR_SILVER - 1, 0),
        Member::new("joytouch", "Kang Myungsung", "p2", "joytouch@example.com")
            .with_counts(MIN_LOGINS_FOR_SILVER, 0),
        Member::restore("erwins", "Shin Seunghan", "p3", "erwins@example.com", Level::Silver)
            .with_counts(60, MIN_RECOMMENDS_FOR_GOLD - 1),
        Member::restore("madnite1", "Lee Sangho", "p4", "madnite1@example.com", Level::Silver)
            .with_counts(60, MIN_RECOMMENDS_FOR_GOLD),
        Member::restore("green", "Oh Mingyu", "p5", "green@example.com", Level::Gold)
            .with_counts(100, 100),
    ]
}

pub fn seed(conn: &Connection, members: &[Member]) {
    let repo = SqliteMemberRepository::try_new(conn).unwrap();
    repo.delete_all().unwrap();
    for member in members {
        repo.add_member(member).unwrap();
    }
}

pub fn stored_level(conn: &Connection, id: &str) -> Level {
    SqliteMemberRepository::try_new(conn)
        .unwrap()
        .get_member(id)
        .unwrap()
        .unwrap_or_else(|| panic!("member {id} should exist"))
        .level()
}

/// Captures every recipient passed to `send`.
#[derive(Default)]
pub struct RecordingNotifier {
    recipients: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn recipients(&self) -> Vec<String> {
        self.recipients.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, recipient: &str, _content: &str) -> Result<(), NotifyError> {
        self.recipients.lock().push(recipient.to_string());
        Ok(())
    }
}

/// Fails the write of one specific member.
pub struct FailOnMember(pub String);

impl FailurePolicy for FailOnMember {
    fn before_write(&self, member: &Member) -> Result<(), InjectedFailure> {
        if member.id == self.0 {
            return Err(InjectedFailure {
                member_id: member.id.clone(),
            });
        }
        Ok(())
    }
}
