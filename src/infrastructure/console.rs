//! Console front end - line commands on stdin drive the cafe session
//!
//! Model calls run on spawned tasks so the tick workers and the prompt stay
//! responsive. Their handles are aborted when the conversation closes, and
//! a reply that still lands for a closed conversation is dropped by the
//! session.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::application::dto::{DialogueOutcome, DialogueRequest};
use crate::application::services::llm::prompt_builder::CAFE_NAME;
use crate::application::services::{CafeError, CafeSession};
use crate::domain::entities::{menu_names, Npc, OrderState};
use crate::infrastructure::state::AppState;
use crate::infrastructure::tick_workers::log_events;

const HELP: &str = "\
Commands:
  w / a / s / d      move up / left / down / right
  talk               talk to the person next to you
  say <text>         say something in the conversation
  give <item>        hand an inventory item to your partner
  serve <item>       serve a fresh menu drink to your partner
  bye                end the conversation
  status             show the cafe
  help               show this help
  quit               leave the game";

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move { dx: i32, dy: i32 },
    Talk,
    Say(String),
    Give(String),
    Serve(String),
    Bye,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "" => return Err(CommandError::Empty),
        "w" | "up" => Command::Move { dx: 0, dy: -1 },
        "s" | "down" => Command::Move { dx: 0, dy: 1 },
        "a" | "left" => Command::Move { dx: -1, dy: 0 },
        "d" | "right" => Command::Move { dx: 1, dy: 0 },
        "talk" | "t" | "e" => Command::Talk,
        "say" => Command::Say(required(rest, "say")?),
        "give" => Command::Give(required(rest, "give")?),
        "serve" => Command::Serve(required(rest, "serve")?),
        "bye" => Command::Bye,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn required(rest: &str, verb: &'static str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(verb))
    } else {
        Ok(rest.to_string())
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut console = Console {
        state,
        in_flight: Vec::new(),
    };

    println!("Welcome to the {}!", CAFE_NAME);
    println!("{}", HELP);

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        console.in_flight.retain(|handle| !handle.is_finished());

        let command = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        console.handle(command).await;
    }

    console.abort_in_flight();
    Ok(())
}

struct Console {
    state: Arc<AppState>,
    /// Model calls for the open conversation
    in_flight: Vec<JoinHandle<()>>,
}

impl Console {
    async fn handle(&mut self, command: Command) {
        match command {
            Command::Move { dx, dy } => self.move_player(dx, dy).await,
            Command::Talk => self.talk().await,
            Command::Say(text) => self.say(&text).await,
            Command::Give(item_name) => self.give(&item_name).await,
            Command::Serve(item_name) => self.serve(&item_name).await,
            Command::Bye => self.bye().await,
            Command::Status => {
                let session = self.state.session.lock().await;
                println!("{}", render_status(&session));
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    async fn move_player(&mut self, dx: i32, dy: i32) {
        let mut session = self.state.session.lock().await;
        if !session.state().is_exploring() {
            println!("You are in a conversation. Type 'bye' first.");
            return;
        }
        let outcome = session.on_move(dx, dy);
        if !outcome.moved {
            println!("You can't go that way.");
            return;
        }
        match session.state().active_npc() {
            Some(npc) => println!("{} {} is here. Type 'talk'.", npc.avatar, npc.name),
            None => println!("You are at {}.", session.state().player().position),
        }
        drop(session);
        log_events(&outcome.events);
    }

    async fn talk(&mut self) {
        let opened = {
            let mut session = self.state.session.lock().await;
            session.on_interact()
        };
        let opened = match opened {
            Ok(opened) => opened,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };
        log_events(&opened.events);
        println!("You start talking to {}. ('bye' to leave)", opened.npc.name);

        let state = Arc::clone(&self.state);
        let conversation_id = opened.conversation_id;
        let npc = opened.npc;
        self.in_flight.push(tokio::spawn(async move {
            let greeting = state.dialogue.greet(&npc).await;
            let recorded = state
                .session
                .lock()
                .await
                .record_greeting(conversation_id, &greeting);
            match recorded {
                Ok(()) => println!("{} {}: {}", greeting.emotion.glyph(), npc.name, greeting.text),
                Err(e) => tracing::debug!(error = %e, "Dropped greeting"),
            }
        }));
    }

    async fn say(&mut self, text: &str) {
        let request = {
            let mut session = self.state.session.lock().await;
            session.begin_turn(text, None)
        };
        match request {
            Ok(request) => self.spawn_reply(request),
            Err(e) => println!("{}", e),
        }
    }

    async fn give(&mut self, item_name: &str) {
        let request = {
            let mut session = self.state.session.lock().await;
            let gift = match session.give_item(item_name) {
                Ok(gift) => gift,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            if gift.accepted {
                println!("You hand over the {} {}.", gift.item.icon, gift.item.name);
            } else {
                println!("They didn't order a {}. You keep it.", gift.item.name);
            }
            log_events(&gift.events);

            let utterance = format!("Here you go, a {}.", gift.item.name);
            session.begin_turn(&utterance, Some(gift.item))
        };
        match request {
            Ok(request) => self.spawn_reply(request),
            Err(e) => println!("{}", e),
        }
    }

    async fn serve(&mut self, item_name: &str) {
        let request = {
            let mut session = self.state.session.lock().await;
            let Some(npc_id) = session.conversation().map(|c| c.npc_id.clone()) else {
                println!("{}", CafeError::NoConversation);
                return;
            };
            let events = match session.on_order_fulfilled(&npc_id, item_name) {
                Ok(events) => events,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            log_events(&events);
            let beverage = session
                .state()
                .find_npc(&npc_id)
                .and_then(|npc| npc.beverage().cloned());
            let Some(beverage) = beverage else {
                return;
            };
            println!("You serve a {} {}.", beverage.icon, beverage.name);

            let utterance = format!("Here is your {}.", beverage.name);
            session.begin_turn(&utterance, Some(beverage))
        };
        match request {
            Ok(request) => self.spawn_reply(request),
            Err(e) => println!("{}", e),
        }
    }

    async fn bye(&mut self) {
        self.abort_in_flight();
        let closed = {
            let mut session = self.state.session.lock().await;
            session.end_conversation()
        };
        let closed = match closed {
            Ok(closed) => closed,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };
        log_events(&closed.events);
        println!("Conversation ended.");

        let Some(npc) = closed.npc else {
            return;
        };
        let state = Arc::clone(&self.state);
        let history = closed.history;
        tokio::spawn(async move {
            let memory = state.dialogue.summarize_memory(&npc, &history).await;
            let stored = state.session.lock().await.store_memory(&npc.id, memory);
            if let Err(e) = stored {
                tracing::debug!(npc_id = %npc.id, error = %e, "Memory not stored");
            }
        });
    }

    fn spawn_reply(&mut self, request: DialogueRequest) {
        let state = Arc::clone(&self.state);
        self.in_flight.push(tokio::spawn(async move {
            let reply = state.dialogue.respond(&request).await;
            let conversation_id = request.conversation_id;
            let npc_name = request.npc.name.clone();
            let line = format!("{} {}: {}", reply.emotion.glyph(), npc_name, reply.text);
            let feedback = reply.feedback.clone();
            let score = reply.fluency_score;

            let outcome = DialogueOutcome {
                conversation_id,
                utterance: request.utterance,
                reply,
            };
            let applied = state.session.lock().await.apply_reply(outcome);
            match applied {
                Ok(events) => {
                    println!("{}", line);
                    if !feedback.is_empty() {
                        println!("   [{}/10] {}", score, feedback);
                    }
                    log_events(&events);
                }
                Err(CafeError::StaleConversation(id)) => {
                    tracing::debug!(conversation_id = %id, "Dropped reply for a closed conversation");
                }
                Err(e) => tracing::warn!(error = %e, "Reply not applied"),
            }
        }));
    }

    fn abort_in_flight(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }
}

/// Text snapshot of the player, missions and NPCs
pub fn render_status(session: &CafeSession) -> String {
    let state = session.state();
    let player = state.player();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Position {}  XP {}  Level {}",
        player.position,
        player.xp(),
        session.player_level()
    );

    let inventory: Vec<String> = player
        .inventory
        .iter()
        .map(|item| format!("{} {}", item.icon, item.name))
        .collect();
    let _ = writeln!(
        out,
        "Inventory: {}",
        if inventory.is_empty() {
            "empty".to_string()
        } else {
            inventory.join(", ")
        }
    );
    let _ = writeln!(out, "Words learned: {}", player.vocabulary.len());
    let _ = writeln!(out, "Menu: {}", menu_names().join(", "));

    let _ = writeln!(out, "Missions:");
    for mission in state.missions() {
        let mark = if mission.is_completed() { "x" } else { " " };
        let _ = writeln!(out, "  [{}] {} - {}", mark, mission.title, mission.description);
    }

    let _ = writeln!(out, "People:");
    for npc in state.npcs() {
        let _ = writeln!(
            out,
            "  {} {} ({}) at {} - {}",
            npc.avatar,
            npc.name,
            npc.role,
            npc.position,
            order_label(npc)
        );
    }
    out.trim_end().to_string()
}

fn order_label(npc: &Npc) -> String {
    match &npc.order {
        OrderState::None => match npc.target() {
            Some(target) => format!("walking to {}", target),
            None => "relaxing".to_string(),
        },
        OrderState::AwaitingOrder { item_name, .. } => format!("waiting for a {}", item_name),
        OrderState::Consuming { beverage, .. } => {
            format!("enjoying a {} {}", beverage.icon, beverage.name)
        }
        OrderState::Leaving { .. } => "leaving".to_string(),
    }
}
