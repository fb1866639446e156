/// plan gating and dealer-group membership
use dealer_credit_rs::{
    CreditConfig, DealerGroupRegistry, EventStore, FeatureKey, PlanTier, SafeTimeProvider, Tenant,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = CreditConfig::standard();
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();

    for tier in PlanTier::ALL {
        let features = config.plans.features(tier);
        println!(
            "{:<10} vehicles {:>9}  group members {:>9}  create group {}",
            tier, features.max_vehicles, features.max_group_members, features.can_create_group
        );
    }

    if let Err(e) = config.plans.ensure_capacity(PlanTier::Demo, FeatureKey::MaxVehicles, 10) {
        println!("demo tenant adding an 11th vehicle: {}", e);
    }

    let mut registry = DealerGroupRegistry::new(config.plans.clone());
    let owner = Tenant::new("Sinar Motor", PlanTier::Pro);
    let dealer = Tenant::new("Jaya Mobil", PlanTier::Basic);

    let code = registry
        .create_group(&owner, "Jabodetabek Network", &time, &mut events)?
        .invite_code
        .clone();
    println!("invite code: {}", code);

    registry.join_group(&dealer, &code, &time, &mut events)?;
    registry.leave_group(dealer.id, &time, &mut events)?;
    registry.dissolve_group(owner.id, &time, &mut events)?;

    for event in events.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
