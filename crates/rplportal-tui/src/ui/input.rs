//! Keyboard input handling for the TUI.
//!
//! Overlays (login, help, quit, invite form, RTO picker, search) take every
//! key while open; otherwise global keys are handled first and the rest go
//! to the current dashboard.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use rplportal_core::dashboard::Dashboard;

use crate::app::{
    can_add_email_char, can_add_name_char, can_add_password_char, can_add_search_char, App,
    AppState, EnrollFocus, LoginFocus,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Enrolling => {
            handle_enroll_input(app, key);
            return Ok(false);
        }
        AppState::PickingOrganization => {
            handle_picker_input(app, key);
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Any key press clears a transient status message
    app.status_message = None;

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.select_tab(index);
        }
        KeyCode::Left => app.prev_tab(),
        KeyCode::Right => app.next_tab(),
        KeyCode::Char('r') => app.refresh_current_tab(),
        KeyCode::Char('o') => app.sign_out().await,
        _ => match app.current_dashboard() {
            Dashboard::Portfolio => handle_students_input(app, key),
            Dashboard::Management => handle_management_input(app, key),
            Dashboard::AssessorQueue => {
                let len = app.assessor_queue.len();
                move_selection(&mut app.assessor_selection, len, key.code);
            }
            Dashboard::StudentHome => {
                let len = app.my_enrollments.len();
                move_selection(&mut app.my_enrollment_selection, len, key.code);
            }
            Dashboard::SignIn => {
                if key.code == KeyCode::Enter {
                    app.start_login();
                }
            }
            Dashboard::Unavailable => {}
        },
    }

    Ok(false)
}

/// Up/Down/Home/End within a list of `len` rows
fn move_selection(selection: &mut usize, len: usize, code: KeyCode) {
    if len == 0 {
        *selection = 0;
        return;
    }
    match code {
        KeyCode::Up | KeyCode::Char('k') => *selection = selection.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => *selection = (*selection + 1).min(len - 1),
        KeyCode::Home => *selection = 0,
        KeyCode::End => *selection = len - 1,
        _ => {}
    }
}

fn handle_students_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.open_enrollment_form(),
        KeyCode::Char('e') => app.endorse_selected(),
        KeyCode::Char('f') => app.cycle_status_filter(),
        KeyCode::Char('/') => {
            app.search_input = app.student_query.search.clone();
            app.state = AppState::Searching;
        }
        KeyCode::Char(']') | KeyCode::PageDown => {
            let page = app.student_query.page + 1;
            app.go_to_page(page);
        }
        KeyCode::Char('[') | KeyCode::PageUp => {
            let page = app.student_query.page.saturating_sub(1);
            app.go_to_page(page);
        }
        KeyCode::Esc => {
            if !app.student_query.search.is_empty() {
                app.search_input.clear();
                app.apply_search();
            }
        }
        code => {
            let len = app.students.len();
            move_selection(&mut app.student_selection, len, code);
        }
    }
}

fn handle_management_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.toggle_management_view(),
        KeyCode::Enter => app.open_org_picker(),
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Esc => {
            app.management_filter.clear();
            app.clamp_management_selection();
        }
        code => {
            let len = app.management_rows().len();
            move_selection(&mut app.management_selection, len, code);
        }
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    let live_filter = app.current_dashboard() == Dashboard::Management;
    let buffer = if live_filter {
        &mut app.management_filter
    } else {
        &mut app.search_input
    };

    match key.code {
        KeyCode::Esc => {
            buffer.clear();
            app.state = AppState::Normal;
            if live_filter {
                app.clamp_management_selection();
            } else {
                app.apply_search();
            }
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            if !live_filter {
                app.apply_search();
            }
        }
        KeyCode::Backspace => {
            buffer.pop();
            if live_filter {
                app.management_selection = 0;
            }
        }
        KeyCode::Char(c) => {
            if can_add_search_char(buffer.chars().count(), c) {
                buffer.push(c);
            }
            if live_filter {
                app.management_selection = 0;
            }
        }
        _ => {}
    }
}

fn handle_picker_input(app: &mut App, key: KeyEvent) {
    // Row 0 is "Unassigned"
    let len = app.management_orgs.len() + 1;
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Enter => app.assign_picked_organization(),
        code => move_selection(&mut app.org_picker_selection, len, code),
    }
}

fn handle_enroll_input(app: &mut App, key: KeyEvent) {
    let focus = app.enroll_focus;
    match key.code {
        KeyCode::Esc => app.close_enrollment_form(),
        KeyCode::Tab => app.set_enroll_focus(focus.next()),
        KeyCode::BackTab => app.set_enroll_focus(focus.prev()),
        KeyCode::Up if focus.is_list() => app.move_enroll_cursor(false),
        KeyCode::Down if focus.is_list() => app.move_enroll_cursor(true),
        KeyCode::Up => app.set_enroll_focus(focus.prev()),
        KeyCode::Down => app.set_enroll_focus(focus.next()),
        KeyCode::Enter => match focus {
            EnrollFocus::Submit => app.submit_enrollment_form(),
            f if f.is_list() => app.choose_enroll_option(),
            f => app.set_enroll_focus(f.next()),
        },
        KeyCode::Backspace | KeyCode::Delete => match focus {
            EnrollFocus::Email => {
                app.enrollment_form.email.pop();
            }
            EnrollFocus::FullName => {
                app.enrollment_form.full_name.pop();
            }
            f if f.is_list() => app.clear_enroll_option(),
            _ => {}
        },
        KeyCode::Char(c) => match focus {
            EnrollFocus::Email => {
                if can_add_email_char(app.enrollment_form.email.chars().count(), c) {
                    app.enrollment_form.email.push(c);
                }
            }
            EnrollFocus::FullName => {
                if can_add_name_char(app.enrollment_form.full_name.chars().count(), c) {
                    app.enrollment_form.full_name.push(c);
                }
            }
            _ => {}
        },
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // Failure leaves login_error set and the overlay open
                if app.attempt_login().await.is_ok() {
                    app.refresh_all_background();
                }
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_bounds() {
        let mut selection = 0;
        move_selection(&mut selection, 3, KeyCode::Up);
        assert_eq!(selection, 0);
        move_selection(&mut selection, 3, KeyCode::Down);
        move_selection(&mut selection, 3, KeyCode::Char('j'));
        move_selection(&mut selection, 3, KeyCode::Down);
        assert_eq!(selection, 2);
        move_selection(&mut selection, 3, KeyCode::Home);
        assert_eq!(selection, 0);
        move_selection(&mut selection, 3, KeyCode::End);
        assert_eq!(selection, 2);

        move_selection(&mut selection, 0, KeyCode::Down);
        assert_eq!(selection, 0);
    }
}
