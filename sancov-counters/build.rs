use std::process::Command;

pub fn get_git_ref() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|git_ref| git_ref.trim().chars().take(6).collect::<String>())
        .filter(|git_ref| !git_ref.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn get_git_msg() -> String {
    Command::new("git")
        .args(["log", "-1", "--pretty=%B"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .unwrap_or_else(|| "unknown".to_string())
        .trim()
        .to_string()
}

fn main() {
    println!("cargo:rustc-env=GIT_REF={}", get_git_ref());
    println!("cargo:rustc-env=GIT_MSG={}", get_git_msg());
}
