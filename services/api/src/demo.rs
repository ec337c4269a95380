use casting::artists::{CastingCatalog, CastingFilter, Category};
use casting::backend::InMemoryBackend;
use casting::dashboard::Dashboard;
use casting::error::AppError;
use casting::slugify;
use casting::submissions::{ModerationService, SubmissionForm, SubmissionIntake};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SlugArgs {
    /// Artist name as typed on the submission form
    pub(crate) name: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Name of the sample applicant that gets approved
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Genre tag for the approved applicant
    #[arg(long)]
    pub(crate) genre: Option<String>,
    /// Skip the rejection half of the walkthrough
    #[arg(long)]
    pub(crate) skip_rejection: bool,
}

pub(crate) fn run_slug(args: SlugArgs) {
    let slug = slugify(&args.name);
    if slug.is_empty() {
        println!("'{}' has no characters usable in a slug", args.name);
    } else {
        println!("{slug}");
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let backend = Arc::new(InMemoryBackend::default());
    let intake = SubmissionIntake::new(backend.clone(), backend.clone());
    let moderation = ModerationService::new(backend.clone(), backend.clone());
    let catalog = CastingCatalog::new(backend.clone());
    let dashboard = Dashboard::new(backend.clone(), backend.clone(), backend);

    println!("Casting back-office demo (in-memory backend)");

    let name = args.name.unwrap_or_else(|| "Ana Clara".to_string());
    let genre = args.genre.unwrap_or_else(|| "MPB".to_string());
    let applicant = intake.submit(sample_form(&name, Category::Cantor, &genre))?;
    println!(
        "  Submission {} received for '{}' ({})",
        applicant.id, applicant.name, applicant.status
    );

    let promotion = moderation.approve(&applicant.id, Some("Perfil aprovado".to_string()))?;
    println!(
        "  Approved: artist {} published at /casting/{}",
        promotion.artist_id, promotion.slug
    );

    if !args.skip_rejection {
        let declined = intake.submit(sample_form("Banda Sem Nome", Category::Banda, "Rock"))?;
        moderation.reject(&declined.id, Some("Material de divulgação incompleto".to_string()))?;
        println!("  Rejected: submission {} ('{}')", declined.id, declined.name);
    }

    let page = catalog.page(&CastingFilter::default())?;
    println!("\nPublic casting page");
    for artist in &page.artists {
        let category = artist
            .fields
            .category
            .map(Category::label)
            .unwrap_or("Sem categoria");
        println!("  - {} [{}] /casting/{}", artist.fields.name, category, artist.slug());
    }
    println!("  Genres: {}", page.genres.join(", "));

    let snapshot = dashboard.snapshot()?;
    println!("\nDashboard");
    println!(
        "  Artists: {} total, {} visible, {} hidden",
        snapshot.artists.total, snapshot.artists.visible, snapshot.artists.hidden
    );
    println!(
        "  Pending: {} submissions, {} contacts",
        snapshot.pending.submissions, snapshot.pending.contacts
    );

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("  Dashboard payload:\n{}", json),
        Err(err) => println!("  Dashboard payload unavailable: {}", err),
    }

    Ok(())
}

fn sample_form(name: &str, category: Category, genre: &str) -> SubmissionForm {
    SubmissionForm {
        name: name.to_string(),
        email: format!("{}@example.com", slugify(name)),
        phone: "(11) 98765-4321".to_string(),
        bio: format!(
            "{name} se apresenta em eventos corporativos, casamentos e festivais há vários anos."
        ),
        profile_image: "memory://artist-images/submissions/sample.jpg".to_string(),
        category,
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        experience_years: Some(6),
        genres: vec![genre.to_string()],
        instagram: None,
        youtube: None,
        spotify: None,
    }
}
