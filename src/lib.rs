//! # Folio
//!
//! Backend for a personal portfolio site with an AI assistant grounded on
//! the site's own content.
//!
//! Folio stores the site's hero copy, roles, projects, experience, skills and
//! technology journey in SQLite, serves them over a JSON API, answers visitor questions through a
//! chain of hosted LLM providers, and keeps project case studies in sync with
//! GitHub README files.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   SQLite     │──▶│  Knowledge   │──▶│    Prompt    │
//! │   content    │   │    base      │   │   assembly   │
//! └──────▲───────┘   └──────────────┘   └──────┬───────┘
//!        │                                     ▼
//! ┌──────┴───────┐   ┌──────────────┐   ┌──────────────┐
//! │   GitHub     │──▶│   README     │◀──│   Provider   │
//! │   webhook    │   │  extraction  │   │ Groq/Gemini/ │
//! └──────────────┘   └──────────────┘   │   OpenAI     │
//!                                       └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! folio init                        # create database
//! folio seed ./config/seed.toml     # load content
//! folio ask "What do you build?"    # ask the assistant
//! folio serve                       # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`content`] | Content store queries |
//! | [`knowledge`] | Knowledge base and project context rendering |
//! | [`prompt`] | System and extraction prompts |
//! | [`provider`] | LLM clients and the fallback chain |
//! | [`assistant`] | Question answering |
//! | [`extract`] | README to project extraction |
//! | [`github`] | Push webhook handling |
//! | [`analytics`] | Visitor event log and stats |
//! | [`seed`] | Bulk content loading |
//! | [`server`] | HTTP API |

pub mod analytics;
pub mod assistant;
pub mod config;
pub mod content;
pub mod db;
pub mod extract;
pub mod github;
pub mod knowledge;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod provider;
pub mod seed;
pub mod server;
