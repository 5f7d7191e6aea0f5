use chrono::NaiveDate;
use feature_state::{GoalTracker, TaskManager, Theme, ThemePreference};
use local_store::{FileStore, LocalStore, SharedStore, StorageKeys};
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> SharedStore {
    Arc::new(FileStore::open(dir.path().join("local_storage.json")).unwrap())
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = open(&dir);
        let tasks = TaskManager::load(Arc::clone(&store)).unwrap();
        let task = tasks
            .add("Apply to two remote roles", NaiveDate::from_ymd_opt(2024, 7, 1))
            .unwrap();
        tasks.add("Finish SQL course", None).unwrap();
        tasks.toggle(&task.id).unwrap();

        let goals = GoalTracker::load(Arc::clone(&store)).unwrap();
        goals.set_monthly_target(6000.0).unwrap();
        goals.set_achieved(1500.0).unwrap();

        ThemePreference::new(store).set(Theme::Dark).unwrap();
    }

    let store = open(&dir);
    let tasks = TaskManager::load(Arc::clone(&store)).unwrap();
    assert_eq!(tasks.tasks().len(), 2);
    assert_eq!(tasks.pending()[0].text, "Finish SQL course");
    let done = &tasks.completed()[0];
    assert_eq!(done.text, "Apply to two remote roles");
    assert_eq!(done.due_date, NaiveDate::from_ymd_opt(2024, 7, 1));

    let goals = GoalTracker::load(Arc::clone(&store)).unwrap();
    assert_eq!(goals.progress_percent(), 25.0);

    assert_eq!(ThemePreference::new(Arc::clone(&store)).resolve(false).unwrap(), Theme::Dark);

    let mut keys = store.keys().unwrap();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            StorageKeys::ACHIEVED_THIS_MONTH,
            StorageKeys::TASKS,
            StorageKeys::MONTHLY_TARGET,
            StorageKeys::THEME,
        ]
    );
}
