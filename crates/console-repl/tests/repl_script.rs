//! Scripted REPL sessions against a config file on disk

use std::io::Write;

use console_repl::{DemoWorld, Driver, ReplConfig};

fn driver_with_config(contents: &str) -> Driver {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    let config = ReplConfig::load(file.path()).unwrap();
    Driver::new(&config, DemoWorld::new()).unwrap()
}

fn run(driver: &mut Driver, script: &str) -> String {
    let mut output = Vec::new();
    driver.run(script.as_bytes(), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_prompt_and_limit_from_config() {
    let mut driver = driver_with_config("prompt = \"$ \"\n[session]\ncandidate_limit = 1\n");
    let output = run(&mut driver, ":type open\n:quit\n");

    assert!(output.starts_with("$ "));
    assert_eq!(driver.session().candidates().len(), 1);
}

#[test]
fn test_unlock_then_open_vault() {
    let mut driver = driver_with_config("");
    let output = run(
        &mut driver,
        ":type open\n:down\n\n:type unlock 1234\n:down\n\n:type open\n:down\n\n",
    );

    assert!(output.contains("error: Error executing command 'Open': Vault is locked"));
    assert!(output.contains("Vault unlocked"));
    assert!(output.contains("Vault opened"));
    assert!(driver.world().door("Vault").unwrap().is_open());
}

#[test]
fn test_unknown_control() {
    let mut driver = driver_with_config("");
    let output = run(&mut driver, ":teleport\n");
    assert!(output.contains("unknown control :teleport"));
}
