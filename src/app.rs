use std::{fs, path::Path};

use anyhow::{Context as _, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    cli::{Cli, Command},
    domain::{self, account::SessionUser, message::Message},
    infra, store,
    store::session::{ProfilePatch, SessionError},
    usecases::{self, bootstrap, chat_session::ChatSession, context::AppContext},
};

pub fn run(cli: Cli) -> Result<()> {
    let mut context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        domain = domain::module_name(),
        store = store::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        log_level = %context.config.logging.level,
        "module boundaries loaded"
    );

    dispatch(&mut context, cli.command)
}

fn dispatch(context: &mut AppContext, command: Command) -> Result<()> {
    match command {
        Command::Register { username, password } => {
            let password = resolve_password(password, true)?;
            let view = context
                .session
                .register(&mut context.store, &username, &password)
                .map_err(session_failure)?;
            println!("Welcome, {}! You are signed in.", view.username);
        }
        Command::Login { username, password } => {
            let password = resolve_password(password, false)?;
            let view = context
                .session
                .login(&mut context.store, &username, &password)
                .map_err(session_failure)?;
            println!("Welcome back, {}!", view.username);
        }
        Command::Logout => {
            context.session.logout(&mut context.store);
            println!("Signed out.");
        }
        Command::Whoami => match context.session.current() {
            Some(user) => {
                let picture = if user.profile_picture.is_empty() {
                    "none"
                } else {
                    "set"
                };
                println!("{} ({}), profile picture: {}", user.username, user.id, picture);
            }
            None => println!("Not signed in."),
        },
        Command::Profile {
            username,
            picture,
            picture_url,
        } => {
            let mut patch = ProfilePatch {
                username,
                profile_picture: picture_url,
            };
            if let Some(path) = picture {
                patch.profile_picture = Some(picture_data_url(&path)?);
            }
            if patch == ProfilePatch::default() {
                println!("Nothing to update.");
                return Ok(());
            }

            let view = context
                .session
                .update_profile(&mut context.store, patch)
                .map_err(session_failure)?;
            println!("Profile updated for {}.", view.username);
        }
        Command::Users { search } => list_users(context, search.as_deref())?,
        Command::Send { peer, text } => {
            let mut chat = open_chat(context, &peer)?;
            match chat.send(&mut context.store, &text) {
                Some(_) => println!("Sent."),
                None => println!("Nothing to send."),
            }
        }
        Command::History { peer } => show_history(context, &peer)?,
        Command::Edit {
            peer,
            message_id,
            text,
        } => {
            let mut chat = open_chat(context, &peer)?;
            if !chat.request_edit(&context.store, &message_id) {
                anyhow::bail!("Only your own messages can be edited.");
            }
            match chat.save_edit(&mut context.store, &text) {
                Some(_) if !text.trim().is_empty() => println!("Edited."),
                _ => println!("Nothing to change."),
            }
        }
        Command::Delete { peer, message_id } => {
            let mut chat = open_chat(context, &peer)?;
            match chat.delete_message(&mut context.store, &message_id) {
                Some(_) => println!("Deleted for both sides."),
                None => println!("No conversation selected."),
            }
        }
    }

    Ok(())
}

fn open_chat(context: &AppContext, peer_name: &str) -> Result<ChatSession> {
    let me = signed_in(context)?;
    let peer = resolve_peer(context, peer_name)?;

    let mut chat = ChatSession::new(me);
    chat.select_peer(peer);
    Ok(chat)
}

fn signed_in(context: &AppContext) -> Result<SessionUser> {
    context
        .session
        .current()
        .cloned()
        .ok_or_else(|| session_failure(SessionError::NoActiveSession))
}

fn resolve_peer(context: &AppContext, peer_name: &str) -> Result<SessionUser> {
    context
        .session
        .peers(&context.store)
        .into_iter()
        .find(|peer| peer.username == peer_name)
        .ok_or_else(|| anyhow::anyhow!("No user named '{peer_name}'."))
}

fn list_users(context: &AppContext, search: Option<&str>) -> Result<()> {
    signed_in(context)?;

    let needle = search.map(str::to_lowercase);
    let peers: Vec<SessionUser> = context
        .session
        .peers(&context.store)
        .into_iter()
        .filter(|peer| {
            needle
                .as_deref()
                .map_or(true, |needle| peer.username.to_lowercase().contains(needle))
        })
        .collect();

    if peers.is_empty() {
        println!("No users found.");
    } else {
        for peer in peers {
            println!("{}", peer.username);
        }
    }

    Ok(())
}

fn show_history(context: &AppContext, peer_name: &str) -> Result<()> {
    let me = signed_in(context)?;
    let peer = resolve_peer(context, peer_name)?;
    let mut chat = ChatSession::new(me);
    chat.select_peer(peer.clone());

    let messages = chat.messages(&context.store);
    if messages.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    for message in &messages {
        println!("{}", render_line(&chat, &peer, message));
    }

    Ok(())
}

fn render_line(chat: &ChatSession, peer: &SessionUser, message: &Message) -> String {
    let author = if message.sender_id == chat.me().id {
        &chat.me().username
    } else {
        &peer.username
    };
    let marker = if message.edited { " (edited)" } else { "" };
    format!(
        "{}  [{}] {}: {}{}",
        message.id, message.timestamp, author, message.content, marker
    )
}

fn session_failure(error: SessionError) -> anyhow::Error {
    tracing::warn!(code = error.code(), "session operation rejected");
    anyhow::anyhow!("{}", error.user_message())
}

fn resolve_password(provided: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    let password = rpassword::prompt_password("Password: ")?;
    if confirm {
        let again = rpassword::prompt_password("Confirm password: ")?;
        if password != again {
            anyhow::bail!("Passwords do not match.");
        }
    }

    Ok(password)
}

fn picture_data_url(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read picture at {}", path.display()))?;
    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}
