use celebrate_core::celebration::ReminderTime;
use celebrate_core::config::CelebrateConfig;
use celebrate_core::date::LeapDayPolicy;
use celebrate_core::language::Language;

#[test]
fn missing_keys_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "language = \"cs\"\n").unwrap();

    let config = CelebrateConfig::load(Some(&path)).unwrap();
    assert_eq!(config.language, Language::Czech);
    assert_eq!(config.leap_day, LeapDayPolicy::Feb28);
    assert_eq!(config.reminders.lead_days, 1);
    assert_eq!(config.reminders.time, ReminderTime { hour: 9, minute: 0 });
}

#[test]
fn every_key_is_read_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "data_dir = \"/tmp/celebrate-data\"\n\
         language = \"de\"\n\
         leap_day = \"mar1\"\n\
         \n\
         [reminders]\n\
         lead_days = 3\n\
         time = \"18:15\"\n",
    )
    .unwrap();

    let config = CelebrateConfig::load(Some(&path)).unwrap();
    assert_eq!(config.data_path(), std::path::PathBuf::from("/tmp/celebrate-data"));
    assert_eq!(config.language, Language::German);
    assert_eq!(config.leap_day, LeapDayPolicy::Mar1);
    assert_eq!(config.reminders.lead_days, 3);
    assert_eq!(config.reminders.time, ReminderTime { hour: 18, minute: 15 });
}

#[test]
fn default_config_file_is_all_comments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    CelebrateConfig::create_default_config(&path).unwrap();

    let loaded = CelebrateConfig::load(Some(&path)).unwrap();
    assert_eq!(loaded, CelebrateConfig::default());
    assert!(loaded.data_path().ends_with(".local/share/celebrate"));
}
