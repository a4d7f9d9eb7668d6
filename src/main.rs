use std::sync::Arc;

use checkout_flow::cart::{AddonEntry, AddonGroup, AddonKind, FormField, ProductForm};
use checkout_flow::ports::memory::{
    MemoryCartStore, MemoryDrawer, MemoryForm, MemoryUrlState, RecordingPresenter,
};
use checkout_flow::{Action, Step, Wizard, WizardConfig, WizardPorts};

/// Headless demo: runs a scripted purchase through the wizard over the
/// in-memory ports and prints what the cart store ended up with.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let store = Arc::new(MemoryCartStore::new());
    let presenter = Arc::new(RecordingPresenter::new());
    let drawer = Arc::new(MemoryDrawer::new());
    let forms = Arc::new(MemoryForm::new(sample_form()));

    let wizard = Wizard::new(
        WizardConfig::instant(),
        vec![
            Step::new("modelo", "Modelo"),
            Step::new("tamanho", "Tamanho"),
            Step::new("acessorios", "Acessórios"),
            Step::new("servicos", "Serviços"),
            Step::new("resumo", "Resumo"),
        ],
        WizardPorts {
            store: store.clone(),
            presenter: presenter.clone(),
            drawer: drawer.clone(),
            url: Arc::new(MemoryUrlState::new()),
            forms,
            host_formatter: None,
        },
    );

    wizard.start().await;

    let script = [
        Action::Next,
        Action::Next,
        Action::ToggleAddon {
            group: 0,
            entry: 0,
            selected: true,
        },
        Action::Next,
        Action::ToggleAddon {
            group: 1,
            entry: 0,
            selected: true,
        },
        Action::GoToStep {
            id: "resumo".to_string(),
        },
        Action::AddToCart,
    ];

    wizard.stage_attribute("modelo", "gravel").await;
    wizard.stage_attribute("tamanho", "56").await;

    for action in script {
        tracing::info!(?action, "dispatching");
        wizard.dispatch(action).await;
    }

    eprintln!("🛒 checkout-flow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Total shown: {}", presenter.price().unwrap_or_default());
    if let Some(progress) = presenter.progress() {
        eprintln!("   Progress:    {}%", progress.percent);
    }
    eprintln!("   Note:        {}", store.note().unwrap_or_default());
    eprintln!("   Attributes:  {:?}", store.attributes());
    eprintln!("   Drawer open: {}", drawer.opens());
    for (i, items) in store.added().iter().enumerate() {
        eprintln!("   Add call {i}:");
        for item in items {
            eprintln!("     variant {} × {} {:?}", item.variant_id, item.quantity, item.properties);
        }
    }

    Ok(())
}

fn sample_form() -> ProductForm {
    ProductForm {
        variant_id: Some(41_234_567),
        quantity: 1,
        unit_price_cents: 899_900,
        fields: vec![FormField::property("Gravação", "gravacao", "Ada")],
        addon_groups: vec![
            AddonGroup {
                kind: AddonKind::Product,
                entries: vec![AddonEntry {
                    unit_price_cents: Some(12_900),
                    ..AddonEntry::new(41_234_900)
                }],
            },
            AddonGroup {
                kind: AddonKind::Service,
                entries: vec![AddonEntry {
                    unit_price_cents: Some(25_000),
                    service_type: Some("montagem".to_string()),
                    display_name: Some("Montagem profissional".to_string()),
                    ..AddonEntry::new(41_235_001)
                }],
            },
        ],
        ..ProductForm::default()
    }
}
