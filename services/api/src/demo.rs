use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use clap::Args;

use admissions::catalog::{CatalogStore, NodeRef};
use admissions::error::AppError;
use admissions::fields::{FieldId, FieldType};
use admissions::intake::{FilePayload, IntakeConfig, RawSubmission};
use admissions::students::{
    AdmissionsService, ApplicationId, ListFilter, Placement, SubmissionOrigin,
};

use crate::infra::{InMemoryApplicationRepository, InMemoryFileStore};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the trash/restore/purge portion of the walkthrough.
    #[arg(long)]
    pub(crate) skip_lifecycle: bool,
}

struct SeededCatalog {
    placement: Placement,
    full_name: FieldId,
    whatsapp: FieldId,
    slot: FieldId,
    photo: FieldId,
    txn_id: FieldId,
    amount: FieldId,
}

fn seed_catalog(store: &mut CatalogStore) -> Result<SeededCatalog, AppError> {
    let arts = store.create_program("Arts")?;
    let dance = store.create_sub_program(arts.id, "Dance")?;
    let course = store.create_course(dance.id, "Bharatanatyam Diploma", 45_000)?;

    let node = NodeRef::SubProgram(dance.id);
    let full_name = store.create_field(node, "Full Name", FieldType::Text, Vec::new(), 1, true)?;
    let whatsapp =
        store.create_field(node, "WhatsApp Number", FieldType::Text, Vec::new(), 2, true)?;
    let slot = store.create_field(
        NodeRef::Course(course.id),
        "Preferred Slot",
        FieldType::Dropdown,
        vec!["Morning".to_string(), "Evening".to_string()],
        3,
        false,
    )?;
    let photo = store.create_field(
        NodeRef::Course(course.id),
        "Passport Photo",
        FieldType::File,
        Vec::new(),
        4,
        false,
    )?;
    let txn_id =
        store.create_field(node, "Transaction ID", FieldType::Text, Vec::new(), 5, false)?;
    let amount = store.create_field(node, "Amount", FieldType::Number, Vec::new(), 6, false)?;

    Ok(SeededCatalog {
        placement: Placement {
            program: arts.id,
            sub_program: Some(dance.id),
            course: Some(course.id),
        },
        full_name: full_name.id,
        whatsapp: whatsapp.id,
        slot: slot.id,
        photo: photo.id,
        txn_id: txn_id.id,
        amount: amount.id,
    })
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Admissions intake demo");

    let catalog = Arc::new(RwLock::new(CatalogStore::new()));
    let seeded = {
        let mut store = catalog.write().expect("catalog lock poisoned");
        seed_catalog(&mut store)?
    };
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let files = Arc::new(InMemoryFileStore::default());
    let service = AdmissionsService::new(
        catalog.clone(),
        repository,
        files.clone(),
        IntakeConfig::default(),
    );

    {
        let store = catalog.read().expect("catalog lock poisoned");
        println!("\nSeeded hierarchy");
        for program in store.tree() {
            println!("- {} ({})", program.name, program.slug);
            for sub_program in &program.sub_programs {
                println!("  - {}", sub_program.name);
                for course in &sub_program.courses {
                    println!("    - {} (fee {})", course.name, course.fee_amount);
                }
            }
        }
    }

    let form = match service.form_for(seeded.placement) {
        Ok(form) => form,
        Err(err) => {
            println!("  Form unavailable: {err}");
            return Ok(());
        }
    };
    println!("\nCourse enrollment form");
    for entry in &form.canonical {
        let marker = if entry.required { "*" } else { "" };
        println!("- {}{marker} (canonical)", entry.label);
    }
    for descriptor in &form.dynamic {
        let marker = if descriptor.required { "*" } else { "" };
        if descriptor.options.is_empty() {
            println!("- {}{marker} [{}]", descriptor.label, descriptor.field_type.label());
        } else {
            println!(
                "- {}{marker} [{}: {}]",
                descriptor.label,
                descriptor.field_type.label(),
                descriptor.options.join(" / ")
            );
        }
    }

    let mut submission = RawSubmission {
        canonical: BTreeMap::new(),
        values: BTreeMap::from([
            (seeded.full_name, "Meera Pillai".to_string()),
            (seeded.whatsapp, "9876543210".to_string()),
            (seeded.slot, "Evening".to_string()),
            (seeded.txn_id, "TXN-2026-0042".to_string()),
            (seeded.amount, "45000".to_string()),
        ]),
        files: BTreeMap::new(),
    };
    submission.files.insert(
        seeded.photo,
        FilePayload {
            file_name: "meera.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            content: vec![0xff, 0xd8, 0xff, 0xe0],
        },
    );

    println!("\nPublic submission");
    let record = match service.submit(SubmissionOrigin::Public, seeded.placement, submission) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Received {} -> status {} (first name '{}', mobile '{}')",
        record.application_id, record.status, record.profile.first_name, record.profile.mobile
    );
    for value in &record.dynamic_values {
        println!("  value: {} = {}", value.label, value.value);
    }
    for document in &record.documents {
        println!(
            "  document: {} -> {}",
            document.document_type, document.storage_key
        );
    }
    for transaction in &record.transactions {
        println!(
            "  payment: {} for {:.0}",
            transaction.transaction_id, transaction.amount
        );
    }
    println!("  stored objects: {}", files.object_count());

    if args.skip_lifecycle {
        return Ok(());
    }

    println!("\nLifecycle walkthrough");
    walk_lifecycle(&service, &record.application_id);

    match service.list(ListFilter::default()) {
        Ok(views) => println!("- Final listing holds {} application(s)", views.len()),
        Err(err) => println!("  Listing unavailable: {err}"),
    }

    Ok(())
}

fn walk_lifecycle(
    service: &AdmissionsService<InMemoryApplicationRepository, InMemoryFileStore>,
    id: &ApplicationId,
) {
    for (label, step) in [
        ("activate", service.activate(id)),
        ("trash", service.trash(id)),
        ("restore", service.restore(id)),
        ("trash again", service.trash(id)),
    ] {
        match step {
            Ok(record) => println!("- {label}: {} -> {}", record.application_id, record.status),
            Err(err) => println!("- {label} failed: {err}"),
        }
    }

    match service.purge(id) {
        Ok(()) => println!("- purge: {id} removed permanently"),
        Err(err) => println!("- purge failed: {err}"),
    }
}
