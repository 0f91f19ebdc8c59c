//! Interactive session over [`StudentView`].
//!
//! Each line is one user action. After every action the shell prints pending
//! toasts and then the screen, so the terminal behaves like the single-page view:
//! counters and search results on top, the detail panel below, one overlay at a time.

use super::commands::{confirm, AppContext};
use super::render::{
    print_delete_dialog, print_form_errors, print_messages, print_toasts, print_view,
};
use colored::Colorize;
use rollbook::api::{CmdMessage, StudentApi};
use rollbook::error::Result;
use rollbook::model::{Field, Student};
use rollbook::notify::Notifications;
use rollbook::store::StudentBackend;
use rollbook::view::{StudentView, SubmitOutcome};
use std::io::{self, BufRead, Write};
use std::time::Duration;

const CANCEL: &str = ":cancel";

pub async fn run(ctx: &AppContext) -> Result<()> {
    let api = &ctx.api;
    let mut view = StudentView::new();
    let mut notes = Notifications::new(Duration::from_secs(ctx.config.toast_secs));

    view.refresh(api).await;
    print_view(&view);
    println!("{}", "Type `help` for commands.".dimmed());

    while let Some(line) = prompt_line("rollbook> ")? {
        let line = line.trim_start();
        let (command, raw_arg) = line.split_once(' ').unwrap_or((line.trim_end(), ""));
        let arg = raw_arg.trim();

        match command {
            "" => continue,
            "help" | "?" => {
                print_help();
                continue;
            }
            "quit" | "exit" | "q" => break,
            "list" => view.toggle_list(),
            // The term goes to the server exactly as typed.
            "search" | "/" => view.search(api, raw_arg).await,
            "clear" => view.clear_search(api).await,
            "refresh" => view.reload(api).await,
            "open" => match arg.parse::<i64>() {
                Ok(id) if view.select_by_id(id) => {}
                _ => eprintln!("{}", format!("No student with id {:?} on screen", arg).red()),
            },
            "close" => view.close_detail(),
            "add" => {
                if view.open_add() {
                    fill_form(api, &mut view, &mut notes).await?;
                }
            }
            "edit" => match target(&view, arg) {
                Some(student) => {
                    if view.open_edit(&student) {
                        fill_form(api, &mut view, &mut notes).await?;
                    }
                }
                None => eprintln!("{}", "Open a student first or pass an id".red()),
            },
            "delete" => match target(&view, arg) {
                Some(student) => confirm_delete(api, &mut view, &mut notes, &student).await?,
                None => eprintln!("{}", "Open a student first or pass an id".red()),
            },
            other => {
                eprintln!("{}", format!("Unknown command: {}", other).red());
                continue;
            }
        }

        print_toasts(&notes.drain());
        print_view(&view);
    }

    Ok(())
}

/// The student named by `arg`, or the one in the detail panel.
fn target(view: &StudentView, arg: &str) -> Option<Student> {
    if arg.is_empty() {
        return view.selected().cloned();
    }
    let id = arg.parse::<i64>().ok()?;
    view.results()
        .iter()
        .chain(view.all_students())
        .find(|s| s.id == id)
        .cloned()
}

/// Prompts for the open form's fields until it saves or the user gives up.
///
/// The first pass asks for every field. Later passes only ask for fields that
/// still show an error, unless the server rejected the submit, in which case all
/// fields are offered again with their current values.
async fn fill_form<B: StudentBackend>(
    api: &StudentApi<B>,
    view: &mut StudentView,
    notes: &mut Notifications,
) -> Result<()> {
    let mut ask_all = true;

    loop {
        let Some(form) = view.form_mut() else {
            return Ok(());
        };
        println!("{}", form.title().bold());

        for field in Field::ALL {
            if !ask_all && form.visible_error(field).is_none() {
                continue;
            }
            let current = form.value(field).to_string();
            let prompt = if current.is_empty() {
                format!("  {}: ", field.label())
            } else {
                format!("  {} [{}]: ", field.label(), current)
            };

            let input = match prompt_line(&prompt)? {
                Some(input) if input.trim() != CANCEL => input,
                _ => {
                    view.cancel_overlay();
                    print_messages(&[CmdMessage::warning("Cancelled.")]);
                    return Ok(());
                }
            };
            if !input.is_empty() {
                form.set(field, input);
            }
            if let Some(err) = form.blur(field) {
                eprintln!("  {}", err.red());
            }
        }

        let label = form.submit_label();
        println!("{}", format!("{}...", label).dimmed());

        match view.submit_form(api, notes).await {
            SubmitOutcome::Saved => return Ok(()),
            SubmitOutcome::Blocked => {
                if let Some(form) = view.form() {
                    print_form_errors(form);
                }
                ask_all = false;
            }
            SubmitOutcome::Failed => {
                if let Some(form) = view.form() {
                    print_form_errors(form);
                }
                if !confirm("Try again? [y/N] ")? {
                    view.cancel_overlay();
                    return Ok(());
                }
                ask_all = true;
            }
        }
    }
}

async fn confirm_delete<B: StudentBackend>(
    api: &StudentApi<B>,
    view: &mut StudentView,
    notes: &mut Notifications,
    student: &Student,
) -> Result<()> {
    if !view.request_delete(student) {
        return Ok(());
    }
    if let Some(dialog) = view.delete_dialog() {
        print_delete_dialog(dialog);
    }

    loop {
        if !confirm("Delete? [y/N] ")? {
            view.cancel_overlay();
            return Ok(());
        }
        match view.confirm_delete(api, notes).await {
            SubmitOutcome::Saved | SubmitOutcome::Blocked => return Ok(()),
            // The dialog stays open; show the failure now so the retry prompt makes sense.
            SubmitOutcome::Failed => print_toasts(&notes.drain()),
        }
    }
}

/// Reads one line. `None` at end of input.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn print_help() {
    let rows = [
        ("list", "toggle the roll-number list"),
        ("search TERM", "search by name, email or roll number"),
        ("clear", "clear the search"),
        ("refresh", "reload from the server"),
        ("open ID", "show a student's details"),
        ("close", "close the detail panel"),
        ("add", "add a student"),
        ("edit [ID]", "edit a student (defaults to the open one)"),
        ("delete [ID]", "delete a student (defaults to the open one)"),
        ("quit", "leave the shell"),
    ];
    for (command, help) in rows {
        println!("  {:<14} {}", command.bold(), help.dimmed());
    }
    println!(
        "  {}",
        format!("Enter {} at any field prompt to abandon the form.", CANCEL).dimmed()
    );
}
