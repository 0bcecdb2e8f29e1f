/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`  — Interactive shell (also used by `open`)
- `ask`   — Upload a file or YouTube URL and ask one question
- `auth`  — Sign in, sign up, Google sign-in, sign out, status
- `theme` — Dark-mode preference

Handlers share a [`Services`] bundle: the configuration, the auth context
and the Q&A backend client wired to the auth subscription.
*/

use crate::api::{HttpBackend, QaBackend};
use crate::auth::{
    store_from_config, AuthContext, GoTrueClient, IdentityProvider, SessionStore, SignUpOutcome,
};
use crate::chat::{ChatMode, ChatWorkspace, Outcome};
use crate::config::Config;
use crate::error::{describe_failure, Result, StudyQaError};
use crate::preferences::Preferences;
use crate::routes::{self, Route};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Special commands parser for the shell
pub mod special_commands;

// Transcript and status rendering
pub mod render;

/// Everything a command handler talks to
pub struct Services {
    pub config: Config,
    pub auth: AuthContext,
    pub backend: Arc<dyn QaBackend>,
    pub preferences_path: PathBuf,
}

impl Services {
    /// Connect to the configured identity provider and backend
    ///
    /// The stored session is restored (and refreshed if needed) before the
    /// backend client is created, so its first request already carries the
    /// bearer token.
    ///
    /// # Errors
    ///
    /// Returns error if the identity provider is not configured or a client
    /// cannot be built
    pub async fn start(config: Config) -> Result<Self> {
        let auth = auth_context(&config)?;
        auth.initialize().await?;
        let backend = Arc::new(HttpBackend::new(config.api.clone(), auth.subscribe())?);
        Self::assemble(config, auth, backend)
    }

    /// Bundle already constructed parts
    pub fn assemble(config: Config, auth: AuthContext, backend: Arc<dyn QaBackend>) -> Result<Self> {
        let preferences_path = match &config.preferences_path {
            Some(path) => path.clone(),
            None => Preferences::default_path()?,
        };
        Ok(Self {
            config,
            auth,
            backend,
            preferences_path,
        })
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::load(&self.preferences_path)
    }
}

/// Build an auth context for the configured provider and session store
pub fn auth_context(config: &Config) -> Result<AuthContext> {
    let provider: Arc<dyn IdentityProvider> = Arc::new(GoTrueClient::new(config.identity.clone())?);
    let store: Arc<dyn SessionStore> = Arc::from(store_from_config(&config.session)?);
    Ok(AuthContext::new(provider, store))
}

fn parse_mode(mode: &str) -> Result<ChatMode> {
    Ok(ChatMode::parse_str(mode).map_err(StudyQaError::Config)?)
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// Interactive shell
pub mod chat {
    //! Interactive shell.
    //!
    //! Reads lines with rustyline, dispatches `/` commands and sends every
    //! other line to the active mode. Chat routes are guarded: without a
    //! session the shell lands on the sign-in prompt.

    use super::*;
    use crate::commands::render;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// What the read loop should do after a line was handled
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ShellAction {
        Continue,
        /// Run the credential prompt, then continue
        SignIn,
        /// Run the sign-up prompt, then continue
        SignUp,
        Exit,
    }

    /// Workspace request issued by a shell line
    enum PendingAction {
        Upload,
        Submit(String),
    }

    /// Shell state: the chat workspace plus the current route
    pub struct Shell {
        services: Services,
        workspace: ChatWorkspace,
        route: Route,
        preferences: Preferences,
    }

    impl Shell {
        pub fn new(services: Services, mode: ChatMode) -> Self {
            let workspace = ChatWorkspace::new(mode, &services.config);
            let preferences = services.preferences();
            Self {
                services,
                workspace,
                route: Route::for_mode(mode),
                preferences,
            }
        }

        pub fn workspace(&self) -> &ChatWorkspace {
            &self.workspace
        }

        pub fn route(&self) -> Route {
            self.route
        }

        pub fn services(&self) -> &Services {
            &self.services
        }

        pub fn preferences(&self) -> Preferences {
            self.preferences
        }

        fn authenticated(&self) -> bool {
            self.services.auth.state().is_authenticated()
        }

        /// Check the chat route guard before touching the workspace
        fn ensure_chat_access(&mut self) -> bool {
            let route = routes::guard(Route::for_mode(self.workspace.mode()), self.authenticated());
            if route == Route::SignIn {
                self.route = route;
                self.workspace.reset();
                println!(
                    "{}",
                    "Please sign in first: /open /signin".color(self.preferences.palette().error)
                );
                return false;
            }
            self.route = route;
            true
        }

        /// Navigate to `path` and render the resulting screen
        ///
        /// Leaving the chat routes discards the chat state, so a chat route
        /// opened afterwards starts empty.
        pub fn open(&mut self, path: &str) -> ShellAction {
            let requested = routes::resolve(path);
            let route = routes::guard(requested, self.authenticated());
            let entering_chat = self.route.chat_mode().is_none();
            self.route = route;
            if route.chat_mode().is_none() {
                self.workspace.reset();
            }
            let palette = self.preferences.palette();

            match route {
                Route::DocumentChat | Route::ImageChat | Route::VideoChat => {
                    if let Some(mode) = route.chat_mode() {
                        if self.workspace.switch_mode(mode) || entering_chat {
                            render::print_mode_header(mode, false, &palette);
                        } else {
                            println!("Already in {} mode", mode);
                        }
                    }
                    ShellAction::Continue
                }
                Route::SignIn => {
                    if requested != Route::SignIn {
                        println!("{} requires sign-in", requested);
                    }
                    ShellAction::SignIn
                }
                Route::SignUp => ShellAction::SignUp,
                Route::Profile => {
                    if let Some(user) = self.services.auth.state().user() {
                        render::print_user(user);
                    }
                    ShellAction::Continue
                }
                Route::AudioQa => {
                    println!("Audio analysis feature coming soon.");
                    ShellAction::Continue
                }
                Route::Home => {
                    println!(
                        "StudyQA turns your PDFs, images and videos into a study partner. Try /document, /image or /video."
                    );
                    ShellAction::Continue
                }
                Route::Pricing => {
                    println!("StudyQA is free while in beta.");
                    ShellAction::Continue
                }
                Route::Features => {
                    for mode in [ChatMode::Document, ChatMode::Image, ChatMode::Video] {
                        println!("{} {}", mode.colored_tag(), mode.description());
                    }
                    ShellAction::Continue
                }
            }
        }

        /// Called after the credential prompt succeeded
        pub fn signed_in(&mut self) {
            self.route = Route::for_mode(self.workspace.mode());
            render::print_mode_header(
                self.workspace.mode(),
                self.workspace.loaded(),
                &self.preferences.palette(),
            );
        }

        /// Select a file for the active mode
        pub fn attach(&mut self, path: &Path) {
            if !self.ensure_chat_access() {
                return;
            }
            let palette = self.preferences.palette();
            let before = self.workspace.messages().len();
            match self.workspace.select_file(&expand_home(path)) {
                Ok(()) => render::print_messages(self.workspace.messages().since(before), &palette),
                Err(e) => println!("{}", palette.error(&describe_failure("upload", &e))),
            }
        }

        async fn perform(&mut self, action: PendingAction) {
            let palette = self.preferences.palette();
            let before = self.workspace.messages().len();
            let backend = self.services.backend.as_ref();
            let outcome = match action {
                PendingAction::Upload => self.workspace.upload(backend).await,
                PendingAction::Submit(input) => self.workspace.submit(backend, &input).await,
            };
            tracing::debug!("Shell action finished: {:?}", outcome);
            render::print_update(&self.workspace, before, &palette);
        }

        /// Handle one line of input
        pub async fn handle_line(&mut self, line: &str) -> Result<ShellAction> {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(ShellAction::Continue);
            }

            let command = match parse_special_command(trimmed) {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", self.preferences.palette().error(&e.to_string()));
                    return Ok(ShellAction::Continue);
                }
            };

            match command {
                SpecialCommand::SwitchMode(mode) => Ok(self.open(Route::for_mode(mode).path())),
                SpecialCommand::Attach(path) => {
                    self.attach(&path);
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::Upload => {
                    if self.ensure_chat_access() {
                        self.perform(PendingAction::Upload).await;
                    }
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::Youtube(url) => {
                    if self.workspace.mode() != ChatMode::Video {
                        let action = self.open(Route::VideoChat.path());
                        if action != ShellAction::Continue {
                            return Ok(action);
                        }
                    }
                    if self.ensure_chat_access() {
                        self.perform(PendingAction::Submit(url)).await;
                    }
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::Open(path) => Ok(self.open(&path)),
                SpecialCommand::ShowStatus => {
                    render::print_status(
                        &self.workspace,
                        &self.services.auth.state(),
                        self.preferences.theme_name(),
                    );
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::ToggleTheme => {
                    self.preferences.toggle();
                    if let Err(e) = self.preferences.save(&self.services.preferences_path) {
                        tracing::warn!("Failed to save preferences: {:#}", e);
                    }
                    println!("Theme: {}", self.preferences.theme_name());
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::WhoAmI => {
                    match self.services.auth.state().user() {
                        Some(user) => render::print_user(user),
                        None => println!("Not signed in"),
                    }
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::SignOut => {
                    self.services.auth.sign_out().await?;
                    self.workspace.reset();
                    self.route = routes::guard(self.route, false);
                    println!("Signed out.");
                    if self.route == Route::SignIn {
                        println!("Sign in again with /open /signin");
                    }
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::Help => {
                    print_help();
                    Ok(ShellAction::Continue)
                }
                SpecialCommand::Exit => Ok(ShellAction::Exit),
                SpecialCommand::None => {
                    if self.ensure_chat_access() {
                        self.perform(PendingAction::Submit(trimmed.to_string()))
                            .await;
                    }
                    Ok(ShellAction::Continue)
                }
            }
        }
    }

    /// Start the interactive shell in a chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `mode` - Optional override for `chat.default_mode`
    /// * `file` - File to attach right away
    pub async fn run_chat(config: Config, mode: Option<String>, file: Option<PathBuf>) -> Result<()> {
        let mode = parse_mode(mode.as_deref().unwrap_or(&config.chat.default_mode))?;
        tracing::info!("Starting interactive shell in {} mode", mode);

        let services = Services::start(config).await?;
        let mut shell = Shell::new(services, mode);
        run_shell(&mut shell, Route::for_mode(mode).path(), file.as_deref()).await
    }

    /// Resolve a route and start the shell there
    pub async fn run_open(config: Config, path: String) -> Result<()> {
        let mode = parse_mode(&config.chat.default_mode)?;
        let services = Services::start(config).await?;
        let mut shell = Shell::new(services, mode);
        run_shell(&mut shell, &path, None).await
    }

    async fn run_shell(shell: &mut Shell, start: &str, file: Option<&Path>) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        render::print_welcome_banner(shell.workspace().mode(), &shell.preferences().palette());

        let action = shell.open(start);
        if !follow_up(shell, &mut rl, action).await? {
            println!("Goodbye!");
            return Ok(());
        }

        if let Some(file) = file {
            shell.attach(file);
        }

        loop {
            let prompt = shell.workspace().mode().prompt();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let action = match shell.handle_line(trimmed).await {
                        Ok(action) => action,
                        Err(e) => {
                            eprintln!("Error: {:#}\n", e);
                            ShellAction::Continue
                        }
                    };
                    if !follow_up(shell, &mut rl, action).await? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Run prompts requested by a shell action; `false` ends the shell
    async fn follow_up(shell: &mut Shell, rl: &mut DefaultEditor, action: ShellAction) -> Result<bool> {
        match action {
            ShellAction::Continue => Ok(true),
            ShellAction::Exit => Ok(false),
            ShellAction::SignIn | ShellAction::SignUp => {
                let sign_up = action == ShellAction::SignUp;
                match super::auth::prompt_credentials(&shell.services().auth, rl, sign_up).await? {
                    true => shell.signed_in(),
                    false => println!("Not signed in. Use /open /signin to try again."),
                }
                Ok(true)
            }
        }
    }

}

// One-shot question
pub mod ask {
    //! Non-interactive upload-and-ask.

    use super::*;
    use crate::commands::render;

    /// What to submit in a one-shot run
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AskRequest {
        pub mode: ChatMode,
        pub file: Option<PathBuf>,
        pub url: Option<String>,
        pub question: Option<String>,
    }

    impl AskRequest {
        /// Check that the inputs fit the mode before anything is sent
        pub fn new(
            mode: &str,
            file: Option<PathBuf>,
            url: Option<String>,
            question: Option<String>,
        ) -> Result<Self> {
            let mode = parse_mode(mode)?;
            match mode {
                ChatMode::Document | ChatMode::Image => {
                    if url.is_some() {
                        return Err(StudyQaError::Config(
                            "--url is only supported in video mode".to_string(),
                        )
                        .into());
                    }
                    if file.is_none() {
                        return Err(StudyQaError::Config(format!(
                            "--file is required in {} mode",
                            mode.media_kind()
                        ))
                        .into());
                    }
                }
                ChatMode::Video => {
                    if file.is_some() == url.is_some() {
                        return Err(StudyQaError::Config(
                            "Video mode needs exactly one of --file or --url".to_string(),
                        )
                        .into());
                    }
                    if question.is_some() {
                        return Err(StudyQaError::Config(
                            "Video mode does not take a question".to_string(),
                        )
                        .into());
                    }
                }
            }
            Ok(Self {
                mode,
                file,
                url,
                question,
            })
        }
    }

    /// Run a one-shot request against the configured services
    pub async fn run_ask(config: Config, request: AskRequest) -> Result<()> {
        let services = Services::start(config).await?;
        let workspace = execute(&services, &request).await?;
        render::print_update(&workspace, 0, &services.preferences().palette());
        Ok(())
    }

    fn check(outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Failed(message) => Err(anyhow::anyhow!(message)),
            _ => Ok(()),
        }
    }

    /// Perform the request and return the resulting transcript
    ///
    /// # Errors
    ///
    /// Returns [`StudyQaError::NotSignedIn`] without a session, and the
    /// user-facing failure message when an upload or question fails.
    pub async fn execute(services: &Services, request: &AskRequest) -> Result<ChatWorkspace> {
        if !services.auth.state().is_authenticated() {
            return Err(StudyQaError::NotSignedIn.into());
        }

        let backend = services.backend.as_ref();
        let mut workspace = ChatWorkspace::new(request.mode, &services.config);

        if let Some(url) = &request.url {
            check(workspace.submit(backend, url).await)?;
        } else if let Some(file) = &request.file {
            workspace.select_file(&expand_home(file))?;
            check(workspace.upload(backend).await)?;
        }

        if let Some(question) = &request.question {
            check(workspace.submit(backend, question).await)?;
        }

        Ok(workspace)
    }

}

// Authentication commands
pub mod auth {
    //! Sign-in, sign-up, Google OAuth, sign-out and status.

    use super::*;
    use crate::cli::AuthCommand;
    use crate::commands::render;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Reject a sign-up whose confirmation does not match
    pub fn check_passwords_match(password: &str, confirmation: &str) -> Result<()> {
        if password != confirmation {
            return Err(StudyQaError::Authentication("Passwords do not match".to_string()).into());
        }
        Ok(())
    }

    fn read_field(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
        match rl.readline(prompt) {
            Ok(line) => {
                let value = line.trim().to_string();
                Ok((!value.is_empty()).then_some(value))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Prompt for credentials until sign-in succeeds or the user gives up
    ///
    /// Provider errors are shown inline and the prompt repeats; an empty
    /// email cancels. Returns whether a session was established.
    pub async fn prompt_credentials(
        auth: &AuthContext,
        rl: &mut DefaultEditor,
        sign_up: bool,
    ) -> Result<bool> {
        let title = if sign_up { "Create an account" } else { "Sign in" };
        println!("{} (leave email empty to cancel)", title.bold());

        loop {
            let Some(email) = read_field(rl, "Email: ")? else {
                return Ok(false);
            };
            let Some(password) = read_field(rl, "Password: ")? else {
                return Ok(false);
            };

            let result = if sign_up {
                let confirmation = read_field(rl, "Confirm password: ")?.unwrap_or_default();
                match check_passwords_match(&password, &confirmation) {
                    Ok(()) => sign_up_and_report(auth, &email, &password).await,
                    Err(e) => Err(e),
                }
            } else {
                auth.sign_in(&email, &password).await.map(|session| {
                    println!("Welcome, {}!", session.user.display_name());
                    true
                })
            };

            match result {
                Ok(signed_in) => return Ok(signed_in),
                Err(e) => println!("{}", format!("{:#}", e).red()),
            }
        }
    }

    async fn sign_up_and_report(auth: &AuthContext, email: &str, password: &str) -> Result<bool> {
        match auth.sign_up(email, password).await? {
            SignUpOutcome::SignedIn(session) => {
                println!("Account created. Welcome, {}!", session.user.display_name());
                Ok(true)
            }
            SignUpOutcome::ConfirmationRequired(_) => {
                println!("Account created. Check {} to confirm your email, then sign in.", email);
                Ok(false)
            }
        }
    }

    /// Handle `studyqa auth ...`
    pub async fn run_auth(config: Config, command: AuthCommand) -> Result<()> {
        match command {
            AuthCommand::Status => status(&config),
            AuthCommand::Signin { email, password } => {
                let auth = auth_context(&config)?;
                match (email, password) {
                    (Some(email), Some(password)) => {
                        let session = auth.sign_in(&email, &password).await?;
                        println!("Signed in as {}", session.user.display_name());
                    }
                    _ => {
                        let mut rl = DefaultEditor::new()?;
                        if !prompt_credentials(&auth, &mut rl, false).await? {
                            return Err(StudyQaError::NotSignedIn.into());
                        }
                    }
                }
                Ok(())
            }
            AuthCommand::Signup { email, password } => {
                let auth = auth_context(&config)?;
                match (email, password) {
                    (Some(email), Some(password)) => {
                        sign_up_and_report(&auth, &email, &password).await?;
                    }
                    _ => {
                        let mut rl = DefaultEditor::new()?;
                        prompt_credentials(&auth, &mut rl, true).await?;
                    }
                }
                Ok(())
            }
            AuthCommand::Google => {
                let auth = auth_context(&config)?;
                let url = auth.google_sign_in_url()?;
                println!("Open this URL in your browser to sign in with Google:\n\n  {}\n", url);
                let mut rl = DefaultEditor::new()?;
                let Some(redirect) = read_field(&mut rl, "Paste the URL you were redirected to: ")? else {
                    return Err(StudyQaError::NotSignedIn.into());
                };
                let session = auth.complete_oauth(&redirect).await?;
                println!("Signed in as {}", session.user.display_name());
                Ok(())
            }
            AuthCommand::Signout => {
                let auth = auth_context(&config)?;
                auth.initialize().await?;
                auth.sign_out().await?;
                println!("Signed out.");
                Ok(())
            }
        }
    }

    /// Print the stored session without contacting the provider
    pub fn status(config: &Config) -> Result<()> {
        let store = store_from_config(&config.session)?;
        match store.load()? {
            Some(session) => {
                render::print_user(&session.user);
                if session.is_expired() {
                    println!("{}", "Session expired; it will be refreshed on next use.".yellow());
                } else if let Some(expires_at) = session.expires_at {
                    println!("Session valid until {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
                }
            }
            None => println!("Not signed in"),
        }
        Ok(())
    }

}

// Theme preference
pub mod theme {
    //! `studyqa theme`.

    use super::*;

    /// Apply a theme action; returns whether the preference changed
    pub fn apply(preferences: &mut Preferences, action: &str) -> Result<bool> {
        let before = preferences.dark_mode;
        match action.trim().to_lowercase().as_str() {
            "show" => {}
            "toggle" => {
                preferences.toggle();
            }
            "dark" | "on" => preferences.dark_mode = true,
            "light" | "off" => preferences.dark_mode = false,
            other => {
                return Err(StudyQaError::Config(format!(
                    "Unknown theme action: {} (expected show, toggle, dark or light)",
                    other
                ))
                .into())
            }
        }
        Ok(preferences.dark_mode != before)
    }

    /// Handle `studyqa theme [action]`
    pub fn run_theme(config: &Config, action: &str) -> Result<()> {
        let path = match &config.preferences_path {
            Some(path) => path.clone(),
            None => Preferences::default_path()?,
        };
        let mut preferences = Preferences::load(&path);
        if apply(&mut preferences, action)? {
            preferences.save(&path)?;
        }
        let palette = preferences.palette();
        println!("Theme: {}", palette.heading(preferences.theme_name()));
        Ok(())
    }

}
