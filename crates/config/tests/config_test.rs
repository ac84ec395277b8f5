//! Integration tests for nested configuration sections

use pretty_assertions::assert_eq;
use strata_config::prelude::*;
use strata_config::{UNDEFINED, config_enum};
use strata_ini::IniSource;
use strata_message::ConfigMessage;

config_enum! {
    pub enum SimpleEnum {
        Unknown = 0 => "UNKNOWN",
        Ready = 1 => "READY",
        Running = 2 => "RUNNING",
        Waiting = 3 => "WAITING",
        Suspended = 4 => "SUSPENDED",
        Finished = 5 => "FINISHED",
        Aborted = 6 => "ABORTED",
    }
    aliases {
        "CREATED" => Ready,
        "BLOCKED" => Waiting,
        "STOPPED" => Suspended,
        "TERMINATED" => Aborted,
    }
}

const DATA: &str = "
[DEFAULT]
password = masterkey

[present]
opt_str = Lorem ipsum
opt_int = 123
enum_list = ready, finished, aborted
main_db = my-main-db
opt_cfgs = db-one, db-two

[master-db]
database = primary:/path/master.fdb
user = tester
password = lockpick

[backup-db]
database = secondary:/path/backup.fdb
# user and password come from the defaults

[my-main-db]
database = main:/path/main.fdb

[db-one]
database = /path/db1.fdb
user = user1

[db-two]
database = /path/db2.fdb

[absent]
# present but empty

[missing_req_sub]
opt_str = Subconfig present but required value missing
opt_int = 456
main_db = sub-config-missing-db-req

[sub-config-missing-db-req]
user = bad_user
";

fn db_config(name: &str) -> Config {
    Config::new(name)
        .with_type_name("DbConfig")
        .with_description("Database connection settings")
        .with_option(StrOption::new("database", "Database connection string").required())
        .with_option(
            StrOption::new("user", "User name")
                .required()
                .with_default("SYSDBA".into()),
        )
        .with_option(StrOption::new("password", "User password"))
}

fn simple_config() -> Config {
    Config::new("simple-config")
        .with_type_name("SimpleConfig")
        .with_description("Main configuration structure for testing hierarchical configs.")
        .with_option(StrOption::new("opt_str", "Simple string option"))
        .with_option(IntOption::new("opt_int", "Simple int option"))
        .with_option(ListOption::<SimpleEnum>::new(
            "enum_list",
            "List of enum values",
        ))
        .with_option(ConfigRefOption::new(
            "main_db",
            "Main database config section name",
            db_config(""),
        ))
        .with_option(ConfigListOption::new(
            "opt_cfgs",
            "List of optional database sections",
            db_config,
        ))
        .with_config(db_config("master-db"))
        .with_config(db_config("backup-db"))
}

fn source() -> IniSource {
    IniSource::from_text(DATA).unwrap()
}

fn text<'a>(config: &'a Config, attr: &str) -> Option<&'a str> {
    config
        .get::<StrOption>(attr)
        .and_then(|option| option.value())
        .map(String::as_str)
}

fn main_db(config: &Config) -> &Config {
    config.get::<ConfigRefOption>("main_db").unwrap().config()
}

fn opt_cfgs(config: &Config) -> &ConfigListOption {
    config.get::<ConfigListOption>("opt_cfgs").unwrap()
}

fn sub<'a>(config: &'a Config, attr: &str) -> &'a Config {
    config.config(attr).unwrap()
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn initial_structure() {
    let cfg = simple_config();
    assert_eq!(cfg.name(), "simple-config");
    assert!(!cfg.is_optional());
    assert_eq!(cfg.options().count(), 5);
    assert_eq!(cfg.configs().len(), 3);

    assert!(cfg.option("opt_str").unwrap().get_as_str().is_empty());
    assert_eq!(cfg.get::<IntOption>("opt_int").unwrap().value(), None);

    let target = main_db(&cfg);
    assert!(target.is_optional());
    assert_eq!(text(target, "database"), None);
    assert_eq!(text(target, "user"), Some("SYSDBA"));
    assert_eq!(text(sub(&cfg, "master-db"), "user"), Some("SYSDBA"));

    assert_eq!(cfg.option("main_db").unwrap().get_as_str(), "");
    assert!(opt_cfgs(&cfg).items().is_empty());
    assert_eq!(cfg.option("opt_cfgs").unwrap().get_formatted(), UNDEFINED);
}

#[test]
fn option_attributes_cannot_be_replaced() {
    let mut cfg = simple_config();
    let err = cfg.add_config_as("opt_str", db_config("x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.to_string().contains("Cannot assign values to option itself"));
}

#[test]
fn list_items_join_configs() {
    let mut cfg = simple_config();
    let list = cfg.get_mut::<ConfigListOption>("opt_cfgs").unwrap();
    list.set_value(Some(vec![db_config("test-db")])).unwrap();
    assert_eq!(cfg.configs().len(), 4);
    assert_eq!(opt_cfgs(&cfg).items()[0].name(), "test-db");

    let list = cfg.get_mut::<ConfigListOption>("opt_cfgs").unwrap();
    let err = list.set_value(Some(vec![Config::new("other")])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "List item[0] has wrong type: Expected 'DbConfig', got 'Config'"
    );
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn missing_section() {
    let source = source();

    let mut optional = simple_config().optional();
    optional.load_config(&source, Some("no-such-section")).unwrap();
    assert_eq!(text(&optional, "opt_str"), None);

    let err = simple_config()
        .load_config(&source, Some("no-such-section"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(
        err.to_string(),
        "Configuration error: section 'no-such-section' not found!"
    );
}

#[test]
fn loads_whole_tree() {
    let mut cfg = simple_config();
    cfg.load_config(&source(), Some("present")).unwrap();
    cfg.validate().unwrap();

    assert_eq!(text(&cfg, "opt_str"), Some("Lorem ipsum"));
    assert_eq!(cfg.get::<IntOption>("opt_int").unwrap().value(), Some(&123));
    assert_eq!(
        cfg.get::<ListOption<SimpleEnum>>("enum_list").unwrap().value(),
        Some(&vec![
            SimpleEnum::Ready,
            SimpleEnum::Finished,
            SimpleEnum::Aborted
        ])
    );

    let target = main_db(&cfg);
    assert_eq!(target.name(), "my-main-db");
    assert_eq!(text(target, "database"), Some("main:/path/main.fdb"));
    assert_eq!(text(target, "user"), Some("SYSDBA"));
    assert_eq!(text(target, "password"), Some("masterkey"));

    let master = sub(&cfg, "master-db");
    assert_eq!(text(master, "database"), Some("primary:/path/master.fdb"));
    assert_eq!(text(master, "user"), Some("tester"));
    assert_eq!(text(master, "password"), Some("lockpick"));

    let backup = sub(&cfg, "backup-db");
    assert_eq!(text(backup, "user"), Some("SYSDBA"));
    assert_eq!(text(backup, "password"), Some("masterkey"));

    let list = opt_cfgs(&cfg);
    assert_eq!(cfg.option("opt_cfgs").unwrap().get_as_str(), "db-one, db-two");
    assert_eq!(list.items().len(), 2);
    assert_eq!(list.items()[0].name(), "db-one");
    assert_eq!(text(&list.items()[0], "user"), Some("user1"));
    assert_eq!(text(&list.items()[0], "password"), Some("masterkey"));
    assert_eq!(list.items()[1].name(), "db-two");
    assert_eq!(text(&list.items()[1], "database"), Some("/path/db2.fdb"));
    assert_eq!(text(&list.items()[1], "user"), Some("SYSDBA"));

    assert_eq!(cfg.configs().len(), 5);
}

#[test]
fn clear_resets_tree() {
    let mut cfg = simple_config();
    cfg.load_config(&source(), Some("present")).unwrap();
    cfg.clear(true);

    assert_eq!(text(&cfg, "opt_str"), None);
    assert_eq!(cfg.get::<IntOption>("opt_int").unwrap().value(), None);
    assert_eq!(text(main_db(&cfg), "database"), None);
    assert_eq!(text(main_db(&cfg), "user"), Some("SYSDBA"));
    assert_eq!(text(main_db(&cfg), "password"), None);
    assert!(opt_cfgs(&cfg).items().is_empty());
    assert_eq!(text(sub(&cfg, "master-db"), "database"), None);
    assert_eq!(text(sub(&cfg, "master-db"), "user"), Some("SYSDBA"));
    assert_eq!(text(sub(&cfg, "backup-db"), "password"), None);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn referenced_section_is_validated() {
    let mut cfg = simple_config();
    cfg.load_config(&source(), Some("missing_req_sub")).unwrap();
    assert_eq!(main_db(&cfg).name(), "sub-config-missing-db-req");
    assert_eq!(text(main_db(&cfg), "database"), None);

    let err = cfg.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(
        err.to_string(),
        "Missing value for required option 'database'"
    );
}

#[test]
fn required_reference_needs_a_name() {
    let mut cfg = Config::new("app").with_option(
        ConfigRefOption::new("main_db", "Main database", db_config("")).required(),
    );
    let err = cfg.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing value for required option 'main_db'"
    );

    cfg.load_config(&source(), Some("present")).unwrap();
    cfg.validate().unwrap();
}

#[test]
fn required_reference_to_missing_section() {
    let source = IniSource::from_text("[app]\nmain_db = nowhere\n").unwrap();
    let mut cfg = Config::new("app").with_option(
        ConfigRefOption::new("main_db", "Main database", db_config("")).required(),
    );
    let err = cfg.load_config(&source, None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: section 'nowhere' not found!"
    );
}

#[test]
fn required_list_needs_items() {
    let mut cfg = Config::new("app").with_option(
        ConfigListOption::new("opt_cfgs", "Databases", db_config).required(),
    );
    cfg.load_config(&source(), Some("absent")).unwrap();
    let err = cfg.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing value for required option 'opt_cfgs'"
    );

    cfg.load_config(&source(), Some("present")).unwrap();
    cfg.validate().unwrap();
}

// ============================================================================
// MESSAGE ROUND TRIP
// ============================================================================

#[test]
fn message_round_trip() {
    let mut written = simple_config();
    written.load_config(&source(), Some("present")).unwrap();
    let mut message = ConfigMessage::new();
    written.save_proto(&mut message);
    let message = ConfigMessage::from_bytes(&message.to_bytes().unwrap()).unwrap();

    let mut read = simple_config();
    read.load_proto(&message).unwrap();

    assert_eq!(text(&read, "opt_str"), Some("Lorem ipsum"));
    assert_eq!(read.get::<IntOption>("opt_int").unwrap().value(), Some(&123));
    assert_eq!(main_db(&read).name(), "my-main-db");
    assert_eq!(text(main_db(&read), "password"), Some("masterkey"));
    assert_eq!(text(sub(&read, "master-db"), "user"), Some("tester"));
    assert_eq!(read.option("opt_cfgs").unwrap().get_as_str(), "db-one, db-two");
    assert_eq!(text(&opt_cfgs(&read).items()[0], "user"), Some("user1"));
    assert_eq!(read.get_config(true), written.get_config(true));
}

#[test]
fn message_without_nested_section() {
    let mut written = simple_config();
    written.load_config(&source(), Some("present")).unwrap();
    let mut message = ConfigMessage::new();
    written.save_proto(&mut message);
    message.remove_config("master-db");

    let mut read = simple_config();
    read.load_proto(&message).unwrap();
    assert_eq!(text(sub(&read, "master-db"), "database"), None);
    assert_eq!(text(sub(&read, "master-db"), "user"), Some("SYSDBA"));
    assert_eq!(text(&read, "opt_str"), Some("Lorem ipsum"));
    assert_eq!(
        text(sub(&read, "backup-db"), "database"),
        Some("secondary:/path/backup.fdb")
    );
}

// ============================================================================
// RENDERING
// ============================================================================

#[test]
fn renders_defaults_commented() {
    let rendered = simple_config().get_config(false);
    assert!(rendered.contains("[simple-config]"));
    assert!(rendered.contains("; Main configuration structure for testing hierarchical configs."));
    assert!(rendered.contains(";opt_str = <UNDEFINED>"));
    assert!(rendered.contains("main_db = \n"));
    assert!(rendered.contains(";opt_cfgs = <UNDEFINED>"));
    assert!(rendered.contains("[master-db]"));
    assert!(rendered.contains(";user = SYSDBA"));
    assert!(rendered.contains("; REQUIRED option.\n; Database connection string\n; Type: str\n"));
}

#[test]
fn renders_loaded_tree() {
    let mut cfg = simple_config();
    cfg.load_config(&source(), Some("present")).unwrap();

    let rendered = cfg.get_config(false);
    for expected in [
        "opt_str = Lorem ipsum",
        "opt_int = 123",
        "enum_list = READY, FINISHED, ABORTED",
        "main_db = my-main-db",
        "opt_cfgs = db-one, db-two",
        "[my-main-db]",
        "database = main:/path/main.fdb",
        "password = masterkey",
        "user = tester",
        "[backup-db]",
        "[db-one]",
        "[db-two]",
        "; Type: list [SimpleEnum]",
        "; Type: configuration section name",
        "; Type: list of configuration section names (for sections of type 'DbConfig')",
    ] {
        assert!(rendered.contains(expected), "missing {expected:?}");
    }

    let plain = cfg.get_config(true);
    assert!(!plain.replace(";user = SYSDBA", "user = SYSDBA").contains(';'));
    assert!(plain.contains("[db-two]\ndatabase = /path/db2.fdb\n;user = SYSDBA\npassword = masterkey\n"));
}

#[test]
fn rendered_text_loads_back() {
    let mut cfg = simple_config();
    cfg.load_config(&source(), Some("present")).unwrap();

    let rendered = IniSource::from_text(&cfg.get_config(false)).unwrap();
    let mut reloaded = simple_config();
    reloaded.load_config(&rendered, None).unwrap();
    reloaded.validate().unwrap();
    assert_eq!(reloaded.get_config(true), cfg.get_config(true));
}
