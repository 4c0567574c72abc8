use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use chrono::Local;
use rust_decimal::Decimal;
use uuid::Uuid;

use tax_mate::catalog::{self, SelectOption};
use tax_mate::config::AppConfig;
use tax_mate::deductions::{self, Deduction, DeductionCategory};
use tax_mate::onboarding::{OnboardingForm, OnboardingPhase, ProfileBuilder};
use tax_mate::store::{AppStore, PersistentStore, StateEvent};
use tax_mate::tax;

const HELP: &str = "\
Commands:
  status                                     Show profile and refund summary
  onboard                                    Start onboarding from the beginning
  edit-profile                               Edit an existing profile
  estimate                                   Break down the refund estimate
  recommend [occupation]                     Suggested deduction categories
  add <category> <amount> [percent] <desc>   Record a deduction
  remove <n|id>                              Remove a deduction
  list                                       List deductions
  reset                                      Clear all data (logout)
  quit                                       Exit";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    let persistent = PersistentStore::open(&config.data_dir)?;
    let store = Arc::new(AppStore::with_key(persistent, config.state_key));

    eprintln!("Tax Mate v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Data: {}", config.data_dir.display());
    eprintln!("   Key: {}", store.key());
    eprintln!("   Type `help` for commands.\n");
    let events = store.subscribe();

    let mut prompter = Prompter::new(io::stdin().lock());

    if store.get_state().needs_onboarding() {
        eprintln!("   No completed profile yet. Type `onboard` to set one up.\n");
    }

    loop {
        let Some(line) = prompter.line("> ")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match run_command(&store, &mut prompter, line) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("Error: {e}"),
        }
        log_events(&events);
    }

    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

fn run_command<R: BufRead>(
    store: &Arc<AppStore>,
    prompter: &mut Prompter<R>,
    line: &str,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "help" | "?" => println!("{HELP}"),
        "quit" | "exit" | "/quit" => return Ok(Flow::Quit),
        "status" => print_status(store),
        "onboard" => onboard(ProfileBuilder::start(Arc::clone(store)), prompter)?,
        "edit-profile" => onboard(ProfileBuilder::resume(Arc::clone(store)), prompter)?,
        "estimate" => print_estimate(store),
        "recommend" => {
            let occupation = if rest.is_empty() {
                store
                    .get_state()
                    .user
                    .map(|u| u.occupation)
                    .unwrap_or_default()
            } else {
                rest.to_string()
            };
            for category in tax::recommended_categories(&occupation) {
                println!("  {:<18} {}", category.as_str(), category.label());
            }
        }
        "add" => {
            let deduction = parse_deduction(rest)?;
            let id = deduction.id;
            deductions::add_deduction(store, deduction)?;
            println!("Added {id}");
        }
        "remove" => {
            let id = resolve_deduction_id(store, rest)?;
            deductions::remove_deduction(store, id)?;
            println!("Removed {id}");
        }
        "list" => print_deductions(store),
        "reset" => {
            let answer = prompter.line("Delete all data? [y/N] ")?.unwrap_or_default();
            if answer.trim().eq_ignore_ascii_case("y") {
                store.reset_state()?;
                println!("All data cleared.");
            }
        }
        other => println!("Unknown command `{other}`. Type `help`."),
    }
    Ok(Flow::Continue)
}

fn log_events(events: &Receiver<StateEvent>) {
    for event in events.try_iter() {
        match event {
            StateEvent::Updated(state) => tracing::debug!(
                onboarding_complete = state.onboarding_complete,
                deductions = state.deductions.len(),
                "State updated"
            ),
            StateEvent::Reset => tracing::debug!("State reset"),
        }
    }
}

// ── Onboarding ───────────────────────────────────────────────────────────

fn onboard<R: BufRead>(mut builder: ProfileBuilder, prompter: &mut Prompter<R>) -> io::Result<()> {
    println!("Enter `<` to go back, or an empty line to keep the shown value.");
    loop {
        let phase = builder.phase();
        if phase.is_terminal() {
            println!("Profile complete.");
            return Ok(());
        }

        println!("\n── {} ──", phase_title(phase));
        let mut form = builder.form().clone();
        match fill_phase(phase, &mut form, prompter) {
            Ok(()) => {}
            Err(Interrupt::Back) => {
                builder.attempt_back();
                continue;
            }
            Err(Interrupt::Eof) => return Ok(()),
            Err(Interrupt::Io(e)) => return Err(e),
        }

        let outcome = builder.attempt_advance(form);
        for (field, message) in outcome.errors.iter() {
            println!("  ! {field}: {message}");
        }
    }
}

fn phase_title(phase: OnboardingPhase) -> &'static str {
    match phase {
        OnboardingPhase::Welcome => "Welcome",
        OnboardingPhase::Occupation => "What do you do?",
        OnboardingPhase::EmploymentIncome => "Employment & income",
        OnboardingPhase::Identity => "About you",
        OnboardingPhase::Household => "Household & work",
        OnboardingPhase::Preferences => "Preferences",
        OnboardingPhase::Complete => "Done",
    }
}

fn fill_phase<R: BufRead>(
    phase: OnboardingPhase,
    form: &mut OnboardingForm,
    prompter: &mut Prompter<R>,
) -> Result<(), Interrupt> {
    match phase {
        OnboardingPhase::Welcome => {
            println!("We'll ask a few questions to estimate your tax refund.");
            prompter.text("Press Enter to begin", "")?;
        }
        OnboardingPhase::Occupation => {
            form.occupation = prompter.choice("Occupation", catalog::OCCUPATIONS, &form.occupation)?;
        }
        OnboardingPhase::EmploymentIncome => {
            form.employment_type =
                prompter.choice("Employment type", &catalog::employment_types(), &form.employment_type)?;
            form.income_range =
                prompter.choice("Income range", catalog::INCOME_RANGES, &form.income_range)?;
        }
        OnboardingPhase::Identity => {
            form.first_name = prompter.text("First name", &form.first_name)?;
            form.last_name = prompter.text("Last name", &form.last_name)?;
            form.email = prompter.text("Email", &form.email)?;
            form.phone = prompter.text("Phone (optional)", &form.phone)?;
        }
        OnboardingPhase::Household => {
            let employer = prompter.text("Employer (optional)", form.employer.as_deref().unwrap_or(""))?;
            form.employer = Some(employer).filter(|s| !s.trim().is_empty());
            form.annual_income = prompter.parsed("Annual income (optional)", form.annual_income)?;
            form.tax_withheld = prompter.parsed("Tax withheld (optional)", form.tax_withheld)?;
            form.has_spouse = prompter.flag("Spouse or partner", form.has_spouse)?;
            form.number_of_dependents = prompter
                .parsed("Dependents", Some(form.number_of_dependents))?
                .unwrap_or(0);
            form.has_home_office = prompter.flag("Work from home", form.has_home_office)?;
            form.has_work_vehicle = prompter.flag("Use a vehicle for work", form.has_work_vehicle)?;
            form.has_work_travel = prompter.flag("Travel for work", form.has_work_travel)?;
        }
        OnboardingPhase::Preferences => {
            form.financial_year_end = prompter.choice(
                "Financial year end",
                &catalog::financial_year_ends(),
                &form.financial_year_end,
            )?;
        }
        OnboardingPhase::Complete => {}
    }
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────────────────

fn print_status(store: &AppStore) {
    let state = store.get_state();
    match &state.user {
        Some(user) if state.onboarding_complete => {
            println!("Profile:    {} <{}>", user.full_name(), user.email);
            println!(
                "Occupation: {}",
                catalog::label_for(catalog::OCCUPATIONS, &user.occupation).unwrap_or(user.occupation.as_str())
            );
            println!("Employment: {}", user.employment_type.label());
            println!("FY end:     {}", user.financial_year_end.label());
        }
        Some(_) => println!("Profile:    in progress (type `edit-profile` to continue)"),
        None => println!("Profile:    none (type `onboard`)"),
    }
    println!("Deductions: {}", state.deductions.len());
    println!(
        "Refund:     {}",
        tax::format_currency(tax::calculate_potential_refund(
            &state.deductions,
            state.user.as_ref()
        ))
    );
}

fn print_estimate(store: &AppStore) {
    let state = store.get_state();
    for (category, total) in tax::claimable_by_category(&state.deductions) {
        println!("  {:<20} {:>12}", category.label(), tax::format_currency(total));
    }
    let total = tax::total_claimable(&state.deductions);
    println!("  {:<20} {:>12}", "Total claimable", tax::format_currency(total));

    match state.user.as_ref().and_then(|u| u.annual_income) {
        Some(income) if !income.is_zero() => {
            let rate = (tax::marginal_rate(income) * Decimal::ONE_HUNDRED).normalize();
            println!("  {:<20} {:>11}%", "Marginal rate", rate.to_string());
        }
        _ => println!("  Add your annual income (edit-profile) to estimate a refund."),
    }
    let refund = tax::calculate_potential_refund(&state.deductions, state.user.as_ref());
    println!("  {:<20} {:>12}", "Potential refund", tax::format_currency(refund));
}

fn print_deductions(store: &AppStore) {
    let state = store.get_state();
    if state.deductions.is_empty() {
        println!("No deductions yet.");
        return;
    }
    for (i, d) in state.deductions.iter().enumerate() {
        println!(
            "{:>3}. {}  {:<18} {:>10} @ {:>3}%  {}  [{}]",
            i + 1,
            d.date,
            d.category.as_str(),
            tax::format_currency(d.amount),
            d.claim_percentage.normalize().to_string(),
            d.description,
            d.id
        );
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────

/// `<category> <amount> [percent] <description>`, dated today.
fn parse_deduction(args: &str) -> Result<Deduction, String> {
    let mut parts = args.split_whitespace();
    let category = parts
        .next()
        .ok_or("usage: add <category> <amount> [percent] <description>")?;
    let category = DeductionCategory::from_str(category)?;

    let amount = parts.next().ok_or("missing amount")?;
    let amount = parse_amount(amount).ok_or_else(|| format!("invalid amount: {amount}"))?;

    let mut rest: Vec<&str> = parts.collect();
    let percentage = match rest.first().and_then(|p| parse_amount(p.trim_end_matches('%'))) {
        Some(pct) if rest.len() > 1 => {
            rest.remove(0);
            Some(pct)
        }
        _ => None,
    };

    let mut deduction = Deduction::new(category, rest.join(" "), amount, Local::now().date_naive());
    if let Some(pct) = percentage {
        deduction = deduction.with_claim_percentage(pct);
    }
    Ok(deduction)
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim().trim_start_matches('$').replace(',', "").as_str()).ok()
}

/// Accepts a 1-based list position or a full id.
fn resolve_deduction_id(store: &AppStore, raw: &str) -> Result<Uuid, String> {
    if let Ok(n) = raw.parse::<usize>() {
        return store
            .get_state()
            .deductions
            .get(n.wrapping_sub(1))
            .map(|d| d.id)
            .ok_or_else(|| format!("no deduction at position {n}"));
    }
    Uuid::parse_str(raw).map_err(|_| format!("not a position or id: {raw}"))
}

// ── Prompting ────────────────────────────────────────────────────────────

enum Interrupt {
    Back,
    Eof,
    Io(io::Error),
}

impl From<io::Error> for Interrupt {
    fn from(e: io::Error) -> Self {
        Interrupt::Io(e)
    }
}

struct Prompter<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> Prompter<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next raw line, or `None` at end of input.
    fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        eprint!("{prompt}");
        io::stderr().flush()?;
        self.lines.next().transpose()
    }

    fn answer(&mut self, label: &str, current: &str) -> Result<Option<String>, Interrupt> {
        let prompt = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };
        let line = self.line(&prompt)?.ok_or(Interrupt::Eof)?;
        match line.trim() {
            "<" => Err(Interrupt::Back),
            "" => Ok(None),
            value => Ok(Some(value.to_string())),
        }
    }

    fn text(&mut self, label: &str, current: &str) -> Result<String, Interrupt> {
        Ok(self
            .answer(label, current)?
            .unwrap_or_else(|| current.to_string()))
    }

    fn flag(&mut self, label: &str, current: bool) -> Result<bool, Interrupt> {
        let shown = if current { "y" } else { "n" };
        loop {
            match self.answer(&format!("{label} (y/n)"), shown)? {
                None => return Ok(current),
                Some(v) if v.eq_ignore_ascii_case("y") || v.eq_ignore_ascii_case("yes") => {
                    return Ok(true);
                }
                Some(v) if v.eq_ignore_ascii_case("n") || v.eq_ignore_ascii_case("no") => {
                    return Ok(false);
                }
                Some(_) => println!("  Please answer y or n."),
            }
        }
    }

    /// Numeric field; `-` clears it.
    fn parsed<T>(&mut self, label: &str, current: Option<T>) -> Result<Option<T>, Interrupt>
    where
        T: FromStr + ToString + Copy,
    {
        let shown = current.map(|v| v.to_string()).unwrap_or_default();
        loop {
            match self.answer(label, &shown)? {
                None => return Ok(current),
                Some(v) if v == "-" => return Ok(None),
                Some(v) => match v.replace(',', "").trim_start_matches('$').parse() {
                    Ok(parsed) => return Ok(Some(parsed)),
                    Err(_) => println!("  Not a number: {v}"),
                },
            }
        }
    }

    /// Pick by number or type the value itself.
    fn choice(
        &mut self,
        label: &str,
        options: &[SelectOption],
        current: &str,
    ) -> Result<String, Interrupt> {
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option.label);
        }
        let Some(answer) = self.answer(label, current)? else {
            return Ok(current.to_string());
        };
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| options.get(n.wrapping_sub(1)))
            .map(|o| o.value.to_string());
        Ok(picked.unwrap_or(answer))
    }
}
