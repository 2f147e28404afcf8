//! Database seeder for igen development and testing.
//!
//! Seeds two companies with their reference rows, a `SUPER_USER`, an
//! `ACCOUNTANT` who belongs to the first company only, and one unclassified
//! transaction of 1000.00. Prints a bearer token for each user.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use igen_db::entities::{
    bank_accounts, companies, cost_centres, counterparties,
    sea_orm_active_enums::{EntityKind, TransactionCategory, TransactionDirection, UserRole},
    transaction_types, transactions, user_companies, users,
};
use igen_shared::{AppConfig, JwtService};

/// Fixed ids so that repeated runs are idempotent.
mod ids {
    use uuid::Uuid;

    pub const ADMIN: Uuid = Uuid::from_u128(0xa001);
    pub const ACCOUNTANT: Uuid = Uuid::from_u128(0xa002);
    pub const LANDLORD: Uuid = Uuid::from_u128(0xe001);
    pub const TRANSACTION: Uuid = Uuid::from_u128(0xf001);

    pub const fn company(n: u128) -> Uuid {
        Uuid::from_u128(0xc000 + n)
    }

    pub const fn bank_account(n: u128) -> Uuid {
        Uuid::from_u128(0xb000 + n)
    }

    pub const fn cost_centre(n: u128) -> Uuid {
        Uuid::from_u128(0xcc00 + n)
    }

    pub const fn transaction_type(n: u128) -> Uuid {
        Uuid::from_u128(0x7700 + n)
    }
}

/// A company and its reference rows.
struct CompanySeed {
    id: Uuid,
    name: &'static str,
    pan: &'static str,
    bank_account: Uuid,
    cost_centre: Uuid,
    transaction_type: Uuid,
}

impl CompanySeed {
    const fn new(n: u128, name: &'static str, pan: &'static str) -> Self {
        Self {
            id: ids::company(n),
            name,
            pan,
            bank_account: ids::bank_account(n),
            cost_centre: ids::cost_centre(n),
            transaction_type: ids::transaction_type(n),
        }
    }
}

#[tokio::main]
async fn main() {
    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = igen_db::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    let acme = CompanySeed::new(1, "Acme Holdings", "AAACA1234A");
    let globex = CompanySeed::new(2, "Globex Estates", "AAACG5678B");

    println!("Seeding companies...");
    for company in [&acme, &globex] {
        seed_company(&db, company).await;
    }

    println!("Seeding entities...");
    seed_landlord(&db).await;

    println!("Seeding users...");
    seed_user(&db, ids::ADMIN, "admin", "Admin User", UserRole::SuperUser, None).await;
    seed_user(
        &db,
        ids::ACCOUNTANT,
        "accountant",
        "Acme Accountant",
        UserRole::Accountant,
        Some(acme.id),
    )
    .await;

    println!("Seeding transactions...");
    seed_transaction(&db, &acme).await;

    let jwt = JwtService::new(config.jwt.clone());
    for (login, id, role) in [
        ("admin", ids::ADMIN, "SUPER_USER"),
        ("accountant", ids::ACCOUNTANT, "ACCOUNTANT"),
    ] {
        match jwt.generate_access_token(id, role) {
            Ok(token) => println!("  {login} token: {token}"),
            Err(e) => eprintln!("  Failed to issue token for {login}: {e}"),
        }
    }

    println!("Seeding complete!");
}

/// Seeds a company with one bank account, cost centre and transaction type.
async fn seed_company(db: &DatabaseConnection, seed: &CompanySeed) {
    if companies::Entity::find_by_id(seed.id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  {} already exists, skipping...", seed.name);
        return;
    }

    let company = companies::ActiveModel {
        id: Set(seed.id),
        name: Set(seed.name.to_string()),
        pan: Set(seed.pan.to_string()),
        ..Default::default()
    };
    if let Err(e) = company.insert(db).await {
        eprintln!("Failed to insert company {}: {e}", seed.name);
        return;
    }

    let bank_account = bank_accounts::ActiveModel {
        id: Set(seed.bank_account),
        company_id: Set(seed.id),
        account_name: Set(format!("{} Operating", seed.name)),
        account_number: Set(seed.pan.to_string()),
        bank_name: Set("State Bank".to_string()),
        is_active: Set(true),
        ..Default::default()
    };
    let cost_centre = cost_centres::ActiveModel {
        id: Set(seed.cost_centre),
        company_id: Set(seed.id),
        name: Set("Head Office".to_string()),
        code: Set("HO".to_string()),
        is_active: Set(true),
        ..Default::default()
    };
    let transaction_type = transaction_types::ActiveModel {
        id: Set(seed.transaction_type),
        company_id: Set(seed.id),
        name: Set("Rent".to_string()),
        category: Set(TransactionCategory::Expense),
        is_active: Set(true),
        ..Default::default()
    };

    let results = [
        bank_account.insert(db).await.map(|_| ()),
        cost_centre.insert(db).await.map(|_| ()),
        transaction_type.insert(db).await.map(|_| ()),
    ];
    match results.into_iter().find_map(Result::err) {
        Some(e) => eprintln!("Failed to seed references for {}: {e}", seed.name),
        None => println!("  Created company: {} ({})", seed.name, seed.id),
    }
}

/// Seeds a vendor entity usable in classifications.
async fn seed_landlord(db: &DatabaseConnection) {
    let id = ids::LANDLORD;
    if counterparties::Entity::find_by_id(id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Landlord already exists, skipping...");
        return;
    }

    let entity = counterparties::ActiveModel {
        id: Set(id),
        name: Set("City Properties".to_string()),
        entity_type: Set(EntityKind::Vendor),
        ..Default::default()
    };
    match entity.insert(db).await {
        Ok(_) => println!("  Created entity: City Properties ({id})"),
        Err(e) => eprintln!("Failed to insert entity: {e}"),
    }
}

/// Seeds a user, with a membership when `company` is set.
async fn seed_user(
    db: &DatabaseConnection,
    id: Uuid,
    login: &str,
    full_name: &str,
    role: UserRole,
    company: Option<Uuid>,
) {
    if users::Entity::find_by_id(id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  User {login} already exists, skipping...");
        return;
    }

    let user = users::ActiveModel {
        id: Set(id),
        user_id: Set(login.to_string()),
        full_name: Set(full_name.to_string()),
        role: Set(role),
        is_active: Set(true),
        ..Default::default()
    };
    if let Err(e) = user.insert(db).await {
        eprintln!("Failed to insert user {login}: {e}");
        return;
    }

    if let Some(company_id) = company {
        let membership = user_companies::ActiveModel {
            user_id: Set(id),
            company_id: Set(company_id),
        };
        if let Err(e) = membership.insert(db).await {
            eprintln!("Failed to add {login} to company: {e}");
            return;
        }
    }
    println!("  Created user: {login}");
}

/// Seeds one unclassified credit of 1000.00.
async fn seed_transaction(db: &DatabaseConnection, company: &CompanySeed) {
    let id = ids::TRANSACTION;
    if transactions::Entity::find_by_id(id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Transaction already exists, skipping...");
        return;
    }

    let transaction = transactions::ActiveModel {
        id: Set(id),
        company_id: Set(company.id),
        bank_account_id: Set(company.bank_account),
        cost_centre_id: Set(company.cost_centre),
        transaction_type_id: Set(company.transaction_type),
        direction: Set(TransactionDirection::Credit),
        amount: Set(Decimal::new(100_000, 2)),
        date: Set(NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid seed date")),
        notes: Set(Some("July rent received".to_string())),
        ..Default::default()
    };
    match transaction.insert(db).await {
        Ok(_) => println!("  Created transaction: 1000.00 ({id})"),
        Err(e) => eprintln!("Failed to insert transaction: {e}"),
    }
}
