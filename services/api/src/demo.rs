use crate::export::write_output;
use crate::infra::{InMemoryApplicationStore, LocalResumeStorage};
use chrono::Utc;
use clap::Args;
use dosmicos_hiring::admin::{AdminCredentials, AdminService};
use dosmicos_hiring::applications::{
    ApplicationField, ApplicationService, ResumeUpload, WizardStep, WizardTransition,
};
use dosmicos_hiring::config::ReportingConfig;
use dosmicos_hiring::error::AppError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_ADMIN_EMAIL: &str = "demo@dosmicos.co";
const DEMO_ADMIN_PASSWORD: &str = "demo-dosmicos";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Directory receiving the uploaded resume, the CSV export, and the PDF report
    #[arg(long, default_value = "demo-output")]
    pub(crate) output_dir: PathBuf,
}

fn demo_answers(step: WizardStep) -> BTreeMap<ApplicationField, String> {
    let answers: &[(ApplicationField, &str)] = match step {
        WizardStep::Identity => &[
            (ApplicationField::FullName, "Camila Restrepo"),
            (ApplicationField::Email, "camila.restrepo@utadeo.edu.co"),
            (ApplicationField::Phone, "+57 310 555 0199"),
            (ApplicationField::University, "Universidad Jorge Tadeo Lozano"),
            (ApplicationField::PortfolioLink, "https://behance.net/camilarestrepo"),
            (
                ApplicationField::ImpressiveAchievement,
                "Lancé la tienda online de ropa de mi mamá y triplicamos ventas en seis meses.",
            ),
        ],
        WizardStep::Diagnostic => &[
            (
                ApplicationField::DiagnosticWhatsWorking,
                "Las fotos de producto transmiten calidez y el tono es cercano.",
            ),
            (
                ApplicationField::DiagnosticImprovements,
                "Faltan historias de clientes reales y guías de tallas en video.",
            ),
            (
                ApplicationField::DiagnosticMissedOpportunity,
                "Los regalos de baby shower: nadie les habla a las amigas de la mamá.",
            ),
        ],
        WizardStep::Campaign => &[
            (ApplicationField::CampaignName, "Abrazos que abrigan"),
            (
                ApplicationField::CampaignConcept,
                "Cada prenda cuenta la historia de quien la regala.",
            ),
            (
                ApplicationField::CampaignExecutions,
                "Reels con abuelas tejedoras\nKit de regalo con tarjeta escrita a mano\nAlianza con pediatras",
            ),
        ],
        WizardStep::Challenge => &[(
            ApplicationField::BudgetChallenge,
            "500 mil en microcreadoras de maternidad, 300 mil en pauta a amigas de embarazadas y 200 mil en empaques para unboxing.",
        )],
    };
    answers
        .iter()
        .map(|(field, value)| (*field, (*value).to_string()))
        .collect()
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { output_dir } = args;

    println!("Dosmicos hiring demo");
    let store = Arc::new(InMemoryApplicationStore::default());
    let resumes = Arc::new(LocalResumeStorage::open(
        output_dir.join("resumes"),
        "http://127.0.0.1:3000",
    )?);
    let applications = ApplicationService::new(store.clone(), resumes);

    let (wizard, view) = applications.open_wizard();
    println!("- Opened wizard {wizard} at step {} of {}", view.step_index + 1, view.total_steps);

    let rejected = applications.next(&wizard)?;
    if matches!(rejected.transition, WizardTransition::Stayed) {
        println!("  Empty step rejected with {} field error(s):", rejected.view.errors.len());
        for (field, message) in &rejected.view.errors {
            println!("    - {field}: {message}");
        }
    }

    let view = applications.attach_resume(
        &wizard,
        ResumeUpload {
            file_name: "hoja de vida camila.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4\n% hoja de vida de ejemplo\n".to_vec(),
        },
    )?;
    println!("  Resume stored at {}", view.values.get(ApplicationField::ResumeUrl));

    let mut stored = None;
    for step in WizardStep::ALL {
        applications.edit_fields(&wizard, demo_answers(step))?;
        let response = applications.next(&wizard)?;
        println!(
            "- {} completed -> {}% progress",
            step.title(),
            response.view.progress_percent
        );
        match response.transition {
            WizardTransition::Submitted(record) => stored = Some(record),
            WizardTransition::SubmissionFailed => {
                println!("  Submission failed: {}", response.view.alert.unwrap_or_default());
                return Ok(());
            }
            WizardTransition::Stayed => {
                println!("  Step rejected: {:?}", response.view.errors);
                return Ok(());
            }
            WizardTransition::Advanced => {}
        }
    }
    let Some(record) = stored else {
        println!("  Wizard finished without a stored application");
        return Ok(());
    };
    println!("- Stored application {} for {}", record.id, record.answers.full_name);

    println!("\nAdmin console demo");
    let admin = AdminService::new(
        store,
        Some(AdminCredentials::from_password(DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD)),
        ReportingConfig::default(),
    );
    let now = Utc::now();
    let token = admin.login(DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD, now)?;
    let snapshot = admin.load_applications(&token, Some("tadeo"), now)?;
    println!(
        "- Search '{}' matched {} of {} application(s) | {} this week | {} today",
        snapshot.search_term,
        snapshot.applications.len(),
        snapshot.loaded,
        snapshot.stats.last_seven_days,
        snapshot.stats.today
    );

    let csv = admin.export_csv(&token, now)?;
    let csv_path = output_dir.join(&csv.file_name);
    write_output(&csv_path, csv.body.as_bytes())?;
    println!("- CSV written to {}", csv_path.display());

    let pdf = admin.export_pdf(&token, &record.id)?;
    let pdf_path = output_dir.join(&pdf.file_name);
    write_output(&pdf_path, &pdf.bytes)?;
    println!(
        "- PDF written to {} ({} page(s))",
        pdf_path.display(),
        pdf.page_count
    );

    admin.logout(&token)?;
    Ok(())
}
