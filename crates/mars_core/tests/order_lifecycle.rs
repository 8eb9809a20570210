use mars_core::db::open_db_in_memory;
use mars_core::{
    Customer, CustomerRepository, DeviceInField, DeviceInFieldRepository, DeviceRepository,
    NewCustomer, NewDevice, NewDeviceInField, NewOrder, OrderChanges, OrderDraft, OrderListQuery,
    OrderRepository, OrderService, OrderStatus, RecordKind, ReferentialIntegrityError, RepoError,
    SqliteCustomerRepository, SqliteDeviceInFieldRepository, SqliteDeviceRepository,
    SqliteOrderRepository, ValidationError,
};
use rusqlite::Connection;

fn clock_at_1000() -> i64 {
    1_000
}

fn clock_at_2500() -> i64 {
    2_500
}

fn seed(conn: &Connection) -> (Customer, DeviceInField) {
    let customer = SqliteCustomerRepository::try_new(conn)
        .unwrap()
        .create_customer(&NewCustomer::new("Foo", "Lenina 1", "Tver"))
        .unwrap();
    let device = SqliteDeviceRepository::try_new(conn)
        .unwrap()
        .create_device(&NewDevice::new("Acme", "X1"))
        .unwrap();
    let unit = SqliteDeviceInFieldRepository::try_new(conn)
        .unwrap()
        .create_device_in_field(&NewDeviceInField::new("SN1", customer.id, device.id, "owned"))
        .unwrap();
    (customer, unit)
}

fn new_order(customer: &Customer, unit: &DeviceInField, status: OrderStatus) -> NewOrder {
    NewOrder {
        device: unit.id,
        customer: customer.id,
        order_description: "display flickers".to_string(),
        order_status: status,
    }
}

fn draft(customer: &Customer, unit: &DeviceInField, status: &str) -> OrderDraft {
    OrderDraft {
        device: unit.id,
        customer: customer.id,
        order_description: "display flickers".to_string(),
        order_status: status.to_string(),
    }
}

fn order_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM orders;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_stamps_created_dt_and_leaves_last_update_empty() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let repo = SqliteOrderRepository::try_new(&conn)
        .unwrap()
        .with_clock(clock_at_1000);

    let created = repo
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();
    assert_eq!(created.created_dt, 1_000);
    assert_eq!(created.last_update_dt, None);

    let loaded = repo.get_order(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.device, unit.id);
    assert_eq!(loaded.customer, customer.id);
    assert_eq!(loaded.order_description, "display flickers");
    assert_eq!(loaded.order_status, OrderStatus::Open);
}

#[test]
fn update_stamps_last_update_and_keeps_created_dt() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let creator = SqliteOrderRepository::try_new(&conn)
        .unwrap()
        .with_clock(clock_at_1000);
    let updater = SqliteOrderRepository::try_new(&conn)
        .unwrap()
        .with_clock(clock_at_2500);

    let created = creator
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();
    let updated = updater
        .update_order(created.id, &OrderChanges::status(OrderStatus::InProgress))
        .unwrap();

    assert_eq!(updated.created_dt, 1_000);
    assert_eq!(updated.last_update_dt, Some(2_500));
    assert_eq!(updated.order_status, OrderStatus::InProgress);
    assert_eq!(updater.get_order(created.id).unwrap().unwrap(), updated);
}

#[test]
fn last_update_never_precedes_created_dt() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let creator = SqliteOrderRepository::try_new(&conn)
        .unwrap()
        .with_clock(clock_at_2500);
    let lagging = SqliteOrderRepository::try_new(&conn)
        .unwrap()
        .with_clock(clock_at_1000);

    let created = creator
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();
    let updated = lagging
        .update_order(created.id, &OrderChanges::description("replaced lamp"))
        .unwrap();

    assert_eq!(updated.created_dt, 2_500);
    assert_eq!(updated.last_update_dt, Some(2_500));
}

#[test]
fn wall_clock_update_is_not_earlier_than_creation() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let repo = SqliteOrderRepository::try_new(&conn).unwrap();

    let created = repo
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();
    let updated = repo
        .update_order(created.id, &OrderChanges::default())
        .unwrap();

    assert_eq!(updated.created_dt, created.created_dt);
    assert!(updated.last_update_dt.unwrap() >= created.created_dt);
}

#[test]
fn create_with_missing_unit_or_customer_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let repo = SqliteOrderRepository::try_new(&conn).unwrap();

    let mut missing_unit = new_order(&customer, &unit, OrderStatus::Open);
    missing_unit.device = 404;
    let err = repo.create_order(&missing_unit).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity(ReferentialIntegrityError::MissingReference {
            field: "device",
            target: RecordKind::DeviceInField,
            id: 404,
        })
    ));

    let mut missing_customer = new_order(&customer, &unit, OrderStatus::Open);
    missing_customer.customer = 404;
    let err = repo.create_order(&missing_customer).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity(ReferentialIntegrityError::MissingReference {
            field: "customer",
            target: RecordKind::Customer,
            id: 404,
        })
    ));

    assert_eq!(order_count(&conn), 0);
}

#[test]
fn rejected_update_applies_no_fields() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let repo = SqliteOrderRepository::try_new(&conn).unwrap();

    let created = repo
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();
    let changes = OrderChanges {
        customer: Some(404),
        order_description: Some("should not land".to_string()),
        order_status: Some(OrderStatus::Closed),
        ..OrderChanges::default()
    };

    let err = repo.update_order(created.id, &changes).unwrap_err();
    assert!(matches!(err, RepoError::ReferentialIntegrity(_)));
    assert_eq!(repo.get_order(created.id).unwrap().unwrap(), created);
}

#[test]
fn update_missing_order_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrderRepository::try_new(&conn).unwrap();

    let err = repo
        .update_order(77, &OrderChanges::status(OrderStatus::Closed))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: RecordKind::Order,
            id: 77
        }
    ));
}

#[test]
fn deleting_unit_referenced_by_order_is_restricted() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let orders = SqliteOrderRepository::try_new(&conn).unwrap();
    let units = SqliteDeviceInFieldRepository::try_new(&conn).unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();

    let order = orders
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();

    let err = units.delete_device_in_field(unit.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity(ReferentialIntegrityError::DeleteRestricted {
            kind: RecordKind::DeviceInField,
            dependent: RecordKind::Order,
            dependents: 1,
            ..
        })
    ));
    assert!(units.get_device_in_field(unit.id).unwrap().is_some());

    orders.delete_order(order.id).unwrap();
    units.delete_device_in_field(unit.id).unwrap();
    customers.delete_customer(customer.id).unwrap();
}

#[test]
fn customer_with_orders_but_no_units_is_restricted() {
    let conn = open_db_in_memory().unwrap();
    let (owner, unit) = seed(&conn);
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let requester = customers
        .create_customer(&NewCustomer::new("Bar", "Mira 2", "Omsk"))
        .unwrap();
    let orders = SqliteOrderRepository::try_new(&conn).unwrap();
    orders
        .create_order(&new_order(&requester, &unit, OrderStatus::NeedInfo))
        .unwrap();

    let err = customers.delete_customer(requester.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity(ReferentialIntegrityError::DeleteRestricted {
            dependent: RecordKind::Order,
            ..
        })
    ));
    assert!(customers.get_customer(owner.id).unwrap().is_some());
}

#[test]
fn list_filters_by_status_customer_and_device() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let repo = SqliteOrderRepository::try_new(&conn).unwrap();

    let open = repo
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();
    let closed = repo
        .create_order(&new_order(&customer, &unit, OrderStatus::Closed))
        .unwrap();

    let only_closed = repo
        .list_orders(&OrderListQuery {
            status: Some(OrderStatus::Closed),
            ..OrderListQuery::default()
        })
        .unwrap();
    assert_eq!(only_closed, vec![closed.clone()]);

    let all = repo
        .list_orders(&OrderListQuery {
            customer: Some(customer.id),
            device: Some(unit.id),
            ..OrderListQuery::default()
        })
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.contains(&open));
    assert!(all.contains(&closed));

    let none = repo
        .list_orders(&OrderListQuery {
            customer: Some(customer.id + 100),
            ..OrderListQuery::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn service_accepts_every_known_status() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let service = OrderService::new(SqliteOrderRepository::try_new(&conn).unwrap());

    for literal in ["open", "closed", "in progress", "need info"] {
        let order = service.create_order(&draft(&customer, &unit, literal)).unwrap();
        assert_eq!(order.order_status.as_str(), literal);
    }
}

#[test]
fn service_rejects_unknown_status_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let service = OrderService::new(SqliteOrderRepository::try_new(&conn).unwrap());

    let err = service
        .create_order(&draft(&customer, &unit, "archived"))
        .unwrap_err();
    match &err {
        RepoError::Validation(ValidationError::InvalidOrderStatus(value)) => {
            assert_eq!(value, "archived");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("archived"));
    assert_eq!(order_count(&conn), 0);
}

#[test]
fn service_status_changes_follow_no_transition_graph() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let service = OrderService::new(SqliteOrderRepository::try_new(&conn).unwrap());

    let order = service.create_order(&draft(&customer, &unit, "closed")).unwrap();
    let reopened = service.set_order_status(order.id, "open").unwrap();
    assert_eq!(reopened.order_status, OrderStatus::Open);
    let waiting = service.set_order_status(order.id, "need info").unwrap();
    assert_eq!(waiting.order_status, OrderStatus::NeedInfo);

    let err = service.set_order_status(order.id, "Closed").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(
        service.get_order(order.id).unwrap().unwrap().order_status,
        OrderStatus::NeedInfo
    );
}

#[test]
fn service_description_update_refreshes_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let service = OrderService::new(
        SqliteOrderRepository::try_new(&conn)
            .unwrap()
            .with_clock(clock_at_1000),
    );

    let order = service.create_order(&draft(&customer, &unit, "open")).unwrap();
    assert_eq!(order.label(), format!("order #{} (open)", order.id));

    let updated = service
        .set_order_description(order.id, "replaced lamp")
        .unwrap();
    assert_eq!(updated.order_description, "replaced lamp");
    assert_eq!(updated.last_update_dt, Some(1_000));
    assert_eq!(updated.created_dt, order.created_dt);

    service.delete_order(order.id).unwrap();
    assert!(service.get_order(order.id).unwrap().is_none());
    assert!(service
        .list_orders(&OrderListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn corrupted_status_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let (customer, unit) = seed(&conn);
    let repo = SqliteOrderRepository::try_new(&conn).unwrap();
    let order = repo
        .create_order(&new_order(&customer, &unit, OrderStatus::Open))
        .unwrap();

    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE orders SET order_status = 'archived';
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();

    let err = repo.get_order(order.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("archived")));
}

#[test]
fn status_serializes_with_storage_literals() {
    let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
    assert_eq!(json, "\"in progress\"");

    let parsed: OrderStatus = serde_json::from_str("\"need info\"").unwrap();
    assert_eq!(parsed, OrderStatus::NeedInfo);
    assert!(serde_json::from_str::<OrderStatus>("\"in_progress\"").is_err());
}
