//! End-to-end checks that progress always follows the ledger sum

use tempfile::TempDir;
use titan_protocol::ledger::sum_deltas;
use titan_protocol::progression::{compute_level, total_xp_for_level, LevelCurve, Rank, RankTable};
use titan_protocol::quests::{QuestCreate, QuestFilter, QuestType, QuestUpdate};
use titan_protocol::{TitanError, Tracker, TrackerConfig};

fn open(dir: &TempDir) -> Tracker {
    Tracker::open(TrackerConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn total_xp_is_the_ledger_sum() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);

    for delta in [120, -20, 45, 300, -5] {
        tracker.award_xp(delta, "adjustment", None, None).unwrap();
    }

    let entries = tracker.ledger_store().entries_for(tracker.config().user_id).unwrap();
    let progress = tracker.progress().unwrap();
    assert_eq!(progress.total_xp, sum_deltas(&entries));
    assert_eq!(progress.total_xp, 440);
    assert_eq!(progress.level_info(), compute_level(440, &LevelCurve::default()));
}

#[test]
fn paying_the_remainder_reaches_the_next_level_exactly() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);
    tracker.award_xp(333, "seed", None, None).unwrap();

    for _ in 0..5 {
        let before = tracker.progress().unwrap();
        let missing = (before.xp_for_next_level - before.xp_into_level) as i64;
        tracker.award_xp(missing, "level up", None, None).unwrap();

        let after = tracker.progress().unwrap();
        assert_eq!(after.level, before.level + 1);
        assert_eq!(after.xp_into_level, 0);
        assert_eq!(after.total_xp as u64, total_xp_for_level(after.level, &LevelCurve::default()));
    }
}

#[test]
fn negative_balance_stays_at_level_one() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);
    tracker.award_xp(-50, "penalty", None, None).unwrap();

    let progress = tracker.progress().unwrap();
    assert_eq!(progress.total_xp, -50);
    assert_eq!(progress.level, 1);
    assert_eq!(progress.xp_into_level, 0);
    assert_eq!(progress.xp_for_next_level, 125);
}

#[test]
fn zero_award_is_rejected() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);
    assert!(matches!(tracker.award_xp(0, "nothing", None, None), Err(TitanError::ZeroDelta)));
    assert!(tracker.ledger(None).unwrap().is_empty());
}

#[test]
fn quest_lifecycle_feeds_progress() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);

    let main = tracker
        .create_quest(QuestCreate::new(QuestType::Main, "Write the proposal").with_reward(100).with_due_date("2026-11-30"))
        .unwrap();
    let daily = tracker
        .create_quest(QuestCreate::new(QuestType::Daily, "Walk").with_reward(25))
        .unwrap();

    let dailies = tracker.list_quests(&QuestFilter { quest_type: Some(QuestType::Daily), ..Default::default() });
    assert_eq!(dailies.len(), 1);
    assert_eq!(dailies[0].id, daily.id);

    let update = QuestUpdate { xp_reward: Some(125), ..Default::default() };
    tracker.update_quest(main.id, &update).unwrap();

    tracker.complete_quest(main.id).unwrap();
    tracker.complete_quest(daily.id).unwrap();
    assert!(matches!(tracker.complete_quest(main.id), Err(TitanError::QuestAlreadyCompleted(_))));

    let progress = tracker.progress().unwrap();
    assert_eq!(progress.total_xp, 150);
    assert_eq!(progress.level, 2);
    assert_eq!(progress.xp_into_level, 25);

    let still_open = tracker.list_quests(&QuestFilter { completed: Some(false), ..Default::default() });
    assert!(still_open.is_empty());
    let done = tracker.list_quests(&QuestFilter { completed: Some(true), ..Default::default() });
    assert_eq!(done.len(), 2);

    let events = tracker.quest_store().events().for_quest(main.id).unwrap();
    assert_eq!(events.len(), 3);
}

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let quest_id = {
        let tracker = open(&dir);
        tracker.award_xp(500, "carry over", None, None).unwrap();
        tracker.create_quest(QuestCreate::new(QuestType::Side, "Later")).unwrap().id
    };

    let tracker = open(&dir);
    assert_eq!(tracker.progress().unwrap().total_xp, 500);
    assert!(tracker.quest_store().get(tracker.config().user_id, quest_id).is_some());
}

#[test]
fn custom_curve_and_ranks_from_config() {
    let dir = TempDir::new().unwrap();
    let tracker = Tracker::open(TrackerConfig {
        data_dir: Some(dir.path().to_path_buf()),
        curve: LevelCurve::new(10, 0).unwrap(),
        ranks: RankTable::new(vec![Rank::new("Bronze", 2), Rank::new("Silver", 4)]),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(tracker.progress().unwrap().rank, "Unranked");

    tracker.award_xp(35, "grind", None, None).unwrap();
    let progress = tracker.progress().unwrap();
    assert_eq!(progress.level, 4);
    assert_eq!(progress.xp_into_level, 5);
    assert_eq!(progress.xp_for_next_level, 10);
    assert_eq!(progress.rank, "Silver");
}

#[test]
fn failed_completion_can_be_retried_for_the_reward() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);
    let quest = tracker
        .create_quest(QuestCreate::new(QuestType::Main, "Launch").with_reward(100))
        .unwrap();

    let blocker = tracker.config().quests_path().with_extension("json.tmp");
    std::fs::create_dir(&blocker).unwrap();
    assert!(tracker.complete_quest(quest.id).is_err());
    assert_eq!(tracker.progress().unwrap().total_xp, 0);

    std::fs::remove_dir(&blocker).unwrap();
    let receipt = tracker.complete_quest(quest.id).unwrap();
    assert_eq!(receipt.xp_awarded, 100);
    assert_eq!(tracker.progress().unwrap().total_xp, 100);
}

#[test]
fn trackers_on_one_data_dir_keep_each_others_quests() {
    let dir = TempDir::new().unwrap();
    let first = open(&dir);
    let second = open(&dir);

    second.create_quest(QuestCreate::new(QuestType::Side, "from cli")).unwrap();
    assert_eq!(first.list_quests(&QuestFilter::default()).len(), 1);
    first.create_quest(QuestCreate::new(QuestType::Main, "from dashboard")).unwrap();

    let reopened = open(&dir);
    let mut titles: Vec<String> = reopened
        .list_quests(&QuestFilter::default())
        .into_iter()
        .map(|q| q.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["from cli", "from dashboard"]);
}

#[test]
fn ledger_json_keeps_null_refs() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir);
    tracker.award_xp(10, "manual", None, None).unwrap();

    let page = serde_json::to_value(tracker.ledger(None).unwrap()).unwrap();
    assert!(page[0]["ref_type"].is_null());
    assert!(page[0].as_object().unwrap().contains_key("ref_id"));
}
