use std::sync::Arc;
use std::time::Duration;

use campus_portal::config::AppConfig;
use campus_portal::core::list_fetcher::ListOutcome;
use campus_portal::core::{History, ListFetcher, Navigator, Portal, QueryStateSync, Resource};
use campus_portal::error::{PortalError, Result};
use campus_portal::model::envelope::ApiOutcome;
use campus_portal::model::{
    Batch, BlogPost, Branch, Category, Chapter, Coupon, Course, Division, Enrollment, HeroSection,
    JobCircular, Lesson, NewsFeed, Opportunity, Partner, Review, Student, Teacher,
};
use campus_portal::utils::input::{input, input_optional, input_password};
use log::{info, warn};
use url::Url;

const RESOURCES: &[&str] = &[
    "branches",
    "divisions",
    "categories",
    "courses",
    "batches",
    "chapters",
    "lessons",
    "students",
    "teachers",
    "enrollments",
    "coupons",
    "reviews",
    "hero-sections",
    "news",
    "partners",
    "opportunities",
    "blogs",
    "jobs",
];

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::load()?;
    let portal = Portal::new(config)?;
    if portal.session().current().is_none() {
        login(&portal).await?;
    }

    loop {
        let signed_in = match portal.session().current() {
            Some(session) => {
                println!("Signed in as {} <{}>", session.name, session.email);
                true
            }
            None => false,
        };

        println!("\nResources: {}", RESOURCES.join(", "));
        let prompt = if signed_in {
            "resource, home, blog <slug>, public <resource>, logout or quit> "
        } else {
            "login, home, blog <slug>, public <resource> or quit> "
        };
        let command = input(prompt)?;
        let mut words = command.split_whitespace();

        match (words.next(), words.next()) {
            (Some("quit" | "q"), _) => break,
            (Some("login"), _) => login(&portal).await?,
            (Some("logout"), _) => {
                portal.logout().await?;
                println!("Signed out");
            }
            (Some("home"), _) => show_home(&portal).await,
            (Some("blog"), Some(slug)) => show_blog(&portal, slug).await,
            (Some("public"), Some(name)) => browse_by_name(&portal, name, true).await?,
            (Some(name), None) if signed_in => browse_by_name(&portal, name, false).await?,
            (Some(_), _) => println!("Unknown command"),
            (None, _) => {}
        }
    }

    Ok(())
}

async fn login(portal: &Portal) -> Result<()> {
    let email = input("Email: ")?;
    let password = input_password("Password: ")?;

    match portal.login(&email, &password).await {
        Ok(ApiOutcome::Success { data, .. }) => println!("Welcome, {}", data.name),
        Ok(ApiOutcome::Failure { message, errors }) => {
            println!("{message}");
            for (field, error) in errors {
                println!("  {field}: {error}");
            }
        }
        Ok(ApiOutcome::NotFound { message }) => println!("{message}"),
        Err(err) => println!("Login failed: {err}"),
    }
    Ok(())
}

async fn show_home(portal: &Portal) {
    let home = match portal.home_page().await {
        Ok(home) => home,
        Err(err) => {
            println!("Something went wrong\n{err}");
            return;
        }
    };

    for hero in &home.hero_sections {
        println!("== {} ==", hero.title);
    }
    if let Some(stats) = &home.stats {
        println!(
            "{} students, {} courses, {} teachers, {} branches",
            stats.students, stats.courses, stats.teachers, stats.branches
        );
    }
    println!("\nFeatured courses");
    for course in &home.featured_courses {
        println!("  {}", course.title);
    }
    println!("\nNews");
    for item in &home.news {
        println!("  {}", item.title);
    }
    println!("\nOpportunities: {}", home.opportunities.len());
    println!("Partners: {}", home.partners.len());
}

async fn show_blog(portal: &Portal, slug: &str) {
    match portal.blog_by_slug(slug).await {
        Ok(ApiOutcome::Success { data, .. }) => {
            println!("{}\n", data.title);
            println!("{}", data.body.as_deref().unwrap_or_default());
        }
        Ok(ApiOutcome::Failure { message, .. } | ApiOutcome::NotFound { message }) => {
            println!("{message}")
        }
        Err(err) => println!("Something went wrong\n{err}"),
    }
}

async fn browse_by_name(portal: &Portal, name: &str, public: bool) -> Result<()> {
    match name {
        "branches" => browse::<Branch>(portal, public).await,
        "divisions" => browse::<Division>(portal, public).await,
        "categories" => browse::<Category>(portal, public).await,
        "courses" => browse::<Course>(portal, public).await,
        "batches" => browse::<Batch>(portal, public).await,
        "chapters" => browse::<Chapter>(portal, public).await,
        "lessons" => browse::<Lesson>(portal, public).await,
        "students" => browse::<Student>(portal, public).await,
        "teachers" => browse::<Teacher>(portal, public).await,
        "enrollments" => browse::<Enrollment>(portal, public).await,
        "coupons" => browse::<Coupon>(portal, public).await,
        "reviews" => browse::<Review>(portal, public).await,
        "hero-sections" => browse::<HeroSection>(portal, public).await,
        "news" => browse::<NewsFeed>(portal, public).await,
        "partners" => browse::<Partner>(portal, public).await,
        "opportunities" => browse::<Opportunity>(portal, public).await,
        "blogs" => browse::<BlogPost>(portal, public).await,
        "jobs" => browse::<JobCircular>(portal, public).await,
        _ => {
            println!("Unknown resource {name}");
            Ok(())
        }
    }
}

/// List view: `/term` searches, `key=value` sets a filter, `n`/`p` page,
/// `s <id> <status>` changes a record's status, `c` clears the filters,
/// `q` goes back.
async fn browse<R: Resource>(portal: &Portal, public: bool) -> Result<()> {
    if public && R::PUBLIC_ENDPOINT.is_none() {
        println!("{} have no public listing", R::LABEL);
        return Ok(());
    }

    let debounce = portal.config().filter_debounce;
    let start = portal.config().api_base_url.join(R::ENDPOINT)?;
    let history = Arc::new(History::new(start));
    let mut filters = QueryStateSync::for_resource::<R>(history.clone(), debounce);
    let keys: Vec<&str> = R::filters().iter().map(|f| f.key).collect();

    if !public {
        match portal.filter_choices::<R>().await {
            Ok(choices) => {
                for (key, options) in choices.iter().filter(|(_, o)| !o.is_empty()) {
                    let shown: Vec<String> = options
                        .iter()
                        .map(|(value, label)| {
                            if value == label {
                                value.clone()
                            } else {
                                format!("{value}={label}")
                            }
                        })
                        .collect();
                    println!("{key}: {}", shown.join(", "));
                }
            }
            Err(err) => warn!("filter options unavailable: {err}"),
        }
    }

    loop {
        let url = history.current();
        let fetcher = ListFetcher::new(portal);
        let outcome = if public {
            fetcher.public().fetch_url::<R>(&url).await
        } else {
            fetcher.fetch_url::<R>(&url).await
        };
        println!("\n{}", outcome.render());

        let prompt = format!("{} [{}]> ", R::LABEL, keys.join(", "));
        let Some(command) = prompt_line(prompt).await? else {
            continue;
        };

        match command.as_str() {
            "q" => break,
            "c" => filters.clear(),
            "n" | "p" => {
                let ListOutcome::Success { pagination, .. } = &outcome else {
                    continue;
                };
                let page = match command.as_str() {
                    "n" if pagination.has_next() => pagination.current_page + 1,
                    "p" if pagination.has_previous() => pagination.current_page - 1,
                    _ => continue,
                };
                history.push(with_page(&url, page));
            }
            search if search.starts_with('/') => {
                filters.set("search", &search[1..]);
                settle(debounce).await;
            }
            status if status.starts_with("s ") && !public => {
                let mut parts = status.split_whitespace().skip(1);
                let (Some(id), Some(value)) = (parts.next(), parts.next()) else {
                    println!("Usage: s <id> <status>");
                    continue;
                };
                let Ok(id) = id.parse::<i64>() else {
                    println!("Not an id: {id}");
                    continue;
                };
                match portal.patch_status::<R>(id, value).await {
                    Ok(ApiOutcome::Success { message, .. }) => {
                        println!("{}", message.as_deref().unwrap_or("Status updated"))
                    }
                    Ok(ApiOutcome::Failure { message, .. } | ApiOutcome::NotFound { message }) => {
                        println!("{message}")
                    }
                    Err(err) => println!("Something went wrong\n{err}"),
                }
            }
            assignment => match assignment.split_once('=') {
                Some((key, value)) if keys.contains(&key.trim()) => {
                    filters.set(key.trim(), value.trim());
                    settle(debounce).await;
                }
                _ => println!("Unknown filter or command"),
            },
        }
    }

    filters.dispose();
    info!("left {} listing", R::LABEL);
    Ok(())
}

/// Reads a line off the runtime's worker threads so the filter timers keep
/// running while the prompt waits.
async fn prompt_line(prompt: String) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || input_optional(&prompt))
        .await
        .map_err(|err| PortalError::Io(std::io::Error::other(err)))?
        .map_err(PortalError::from)
}

fn with_page(url: &Url, page: u32) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| k != "page")
        .collect();
    let mut next = url.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("page", &page.to_string());
    next
}

/// Waits out the filter debounce so the URL reflects the last edit.
async fn settle(debounce: Duration) {
    tokio::time::sleep(debounce + Duration::from_millis(20)).await;
}
