use colored::Colorize;
use playedit_store::{Edit, ImageType, Listing, RemoteImage};
use playedit_sync::{ImageAction, SyncReport};
use tabled::builder::Builder;
use tabled::settings::Style;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_edit(edit: &Edit) {
    println!("{}", "Edit".red().bold());
    println!("{}: {}", "ID".green().bold(), edit.id);
    println!("{}: {}", "Expires at".green().bold(), format_expiry(edit));
}

fn format_expiry(edit: &Edit) -> String {
    edit.expiry_unix()
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_listing(listing: &Listing) {
    println!("{}", "Listing".red().bold());
    println!("{}: {}", "Language".green(), listing.language.as_str().red());
    println!("{}: {}", "Title".green(), listing.title);
    println!("{}: {}", "Short Description".green(), listing.short_description);
    println!(
        "{}:\n{}",
        "Full Description".green(),
        listing.full_description.dimmed()
    );
    if let Some(video) = &listing.video {
        println!("{}: {}", "Video".green(), video);
    }
}

pub fn print_images(image_type: ImageType, images: &[RemoteImage]) {
    println!("{}:", image_type.as_str().green());
    let mut builder = Builder::default();
    builder.push_record(["ID", "SHA1", "URL"]);
    for image in images {
        builder.push_record([image.id.as_str(), image.fingerprint.as_str(), image.url.as_str()]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}

/// Per-bucket summary of a run, listing every upload and delete.
pub fn print_report(report: &SyncReport) {
    for locale in &report.deleted_locales {
        println!("{} {}", "Deleted listing".yellow(), locale.as_str().red());
    }

    let buckets: Vec<_> = report.buckets().collect();
    if buckets.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Locale", "Image type", "Kept", "Deleted", "Uploaded"]);
    for bucket in &buckets {
        builder.push_record([
            bucket.locale.to_string(),
            bucket.image_type.to_string(),
            bucket.kept().to_string(),
            bucket.deleted().to_string(),
            bucket.uploaded().to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    for bucket in buckets.iter().filter(|b| !b.is_unchanged()) {
        for action in &bucket.actions {
            match action {
                ImageAction::Keep { .. } => {}
                ImageAction::Delete { id } => {
                    println!("  {} {}/{} {}", "-".red(), bucket.locale, bucket.image_type, id)
                }
                ImageAction::Upload { name, id } => println!(
                    "  {} {}/{} {} ({})",
                    "+".green(),
                    bucket.locale,
                    bucket.image_type,
                    name,
                    id.dimmed()
                ),
            }
        }
    }
}
