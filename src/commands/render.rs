//! Terminal rendering of transcripts, video timestamps and session details

use crate::api::youtube;
use crate::api::VideoTimestamp;
use crate::auth::{AuthState, User};
use crate::chat::{ChatMode, ChatWorkspace, Message, ModeState, Sender};
use crate::preferences::Palette;
use colored::Colorize;
use prettytable::{format, row, Table};

/// Print transcript entries
pub fn print_messages(messages: &[Message], palette: &Palette) {
    for message in messages {
        println!("{}", format_message(message, palette));
    }
}

fn format_message(message: &Message, palette: &Palette) -> String {
    match (message.sender, message.is_context) {
        (Sender::User, _) => format!("{} {}", palette.user("you:"), message.content),
        (Sender::Assistant, true) => format!("    {}", palette.context(&message.content)),
        (Sender::Assistant, false) => {
            format!("{} {}", "assistant:".bold(), palette.assistant(&message.content))
        }
    }
}

/// Print the clickable moments of a YouTube summary
pub fn print_timestamps(timestamps: &[VideoTimestamp]) {
    if timestamps.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["Time".bold(), "Seconds".bold(), "Watch".bold()]);
    for ts in timestamps {
        table.add_row(row![ts.timestamp.cyan(), ts.start_seconds, ts.embed_url]);
    }

    println!("\nKey moments:");
    table.printstd();
    println!();
}

/// Print what an action added to the active mode
///
/// Video results also list their status line, preview link and timestamps.
pub fn print_update(workspace: &ChatWorkspace, since: usize, palette: &Palette) {
    print_messages(workspace.messages().since(since), palette);

    if let ModeState::Video(chat) = workspace.state() {
        if chat.response_text().is_none() {
            return;
        }
        if let Some(status) = chat.status() {
            println!("{}", status.dimmed());
        }
        if let Some(id) = chat.video_id() {
            println!("Preview: {}", youtube::embed_url(id).underline());
        }
        print_timestamps(chat.timestamps());
    }
}

/// Display the welcome banner at the start of the shell
pub fn print_welcome_banner(mode: ChatMode, palette: &Palette) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              StudyQA Interactive Shell - Welcome!            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    print_mode_header(mode, false, palette);
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Title and subtitle of a mode
pub fn print_mode_header(mode: ChatMode, loaded: bool, palette: &Palette) {
    println!("{} {}", mode.colored_tag(), palette.heading(mode.title()));
    println!("{}\n", mode.subtitle(loaded));
}

/// Display detailed status of the shell session
pub fn print_status(workspace: &ChatWorkspace, auth: &AuthState, theme: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     StudyQA Session Status                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let mode = workspace.mode();
    println!("Mode:           {} ({})", mode.colored_tag(), mode.description());

    match workspace.state() {
        ModeState::Document(chat) => {
            println!(
                "Selected File:  {}",
                chat.file().map(|f| f.file_name.as_str()).unwrap_or("-")
            );
            match (chat.document_id(), chat.page_count()) {
                (Some(id), Some(pages)) => println!("Document:       {} ({} pages)", id, pages),
                _ => println!("Document:       not uploaded"),
            }
        }
        ModeState::Image(chat) => {
            println!(
                "Selected File:  {}",
                chat.file().map(|f| f.file_name.as_str()).unwrap_or("-")
            );
            println!("Image:          {}", chat.image_id().unwrap_or("not uploaded"));
        }
        ModeState::Video(chat) => {
            println!(
                "Selected File:  {}",
                chat.file().map(|f| f.file_name.as_str()).unwrap_or("-")
            );
            println!("Last Result:    {}", chat.status().unwrap_or("-"));
        }
    }

    println!("Messages:       {}", workspace.messages().len());
    if let Some(error) = workspace.error() {
        println!("Last Error:     {}", error.red());
    }
    match auth.user() {
        Some(user) => println!("Signed In As:   {}", user.display_name()),
        None => println!("Signed In As:   {}", "nobody".yellow()),
    }
    println!("Theme:          {}", theme);
    println!();
}

/// Print the profile of the signed-in user
pub fn print_user(user: &User) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(row!["Name".bold(), user.display_name()]);
    table.add_row(row!["Email".bold(), user.email.as_deref().unwrap_or("-")]);
    table.add_row(row!["User ID".bold(), user.id]);
    if let Some(created) = user.created_at {
        table.add_row(row![
            "Member Since".bold(),
            created.format("%Y-%m-%d").to_string()
        ]);
    }
    if let Some(last) = user.last_sign_in_at {
        table.add_row(row![
            "Last Sign In".bold(),
            last.format("%Y-%m-%d %H:%M").to_string()
        ]);
    }
    table.printstd();
}
