// Drives the compiled binary through a PTY: real event loop, real crossterm
// input.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn menu_game_menu_quit() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("emoji-tap");
    let data = tempfile::tempdir()?;
    let cmd = format!("{} --seed 7 --data-dir {}", bin.display(), data.path().display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start, tap a couple of cells, back to the menu, quit
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("12")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("q")?;

    p.expect(Eof)?;
    Ok(())
}
