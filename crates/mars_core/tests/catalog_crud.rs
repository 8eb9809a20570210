use mars_core::db::open_db_in_memory;
use mars_core::{
    CustomerListQuery, CustomerRepository, DeviceInFieldRepository, DeviceListQuery,
    DeviceRepository, NewCustomer, NewDevice, NewDeviceInField, ReferentialIntegrityError,
    RecordKind, RepoError, SqliteCustomerRepository, SqliteDeviceInFieldRepository,
    SqliteDeviceRepository,
};

#[test]
fn create_and_get_device_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();

    let created = repo.create_device(&NewDevice::new("Acme", "X1")).unwrap();
    let loaded = repo.get_device(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.manufacturer, "Acme");
    assert_eq!(loaded.model, "X1");
    assert_eq!(loaded.label(), "Acme X1");
}

#[test]
fn create_and_get_customer_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let submitted = NewCustomer::new("Foo", "Lenina 1", "Tver");
    let created = repo.create_customer(&submitted).unwrap();
    let loaded = repo.get_customer(created.id).unwrap().unwrap();

    assert_eq!(loaded.customer_name, submitted.customer_name);
    assert_eq!(loaded.customer_address, submitted.customer_address);
    assert_eq!(loaded.customer_city, submitted.customer_city);
    assert_eq!(loaded.label(), "Foo");
}

#[test]
fn ids_are_unique_and_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();

    let first = repo.create_device(&NewDevice::new("Acme", "X1")).unwrap();
    let second = repo.create_device(&NewDevice::new("Acme", "X2")).unwrap();
    assert_ne!(first.id, second.id);

    repo.delete_device(second.id).unwrap();
    let third = repo.create_device(&NewDevice::new("Acme", "X3")).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn update_device_and_customer() {
    let conn = open_db_in_memory().unwrap();
    let devices = SqliteDeviceRepository::try_new(&conn).unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut device = devices.create_device(&NewDevice::new("Acme", "X1")).unwrap();
    device.model = "X1 Pro".to_string();
    devices.update_device(&device).unwrap();
    assert_eq!(
        devices.get_device(device.id).unwrap().unwrap().label(),
        "Acme X1 Pro"
    );

    let mut customer = customers
        .create_customer(&NewCustomer::new("Foo", "Lenina 1", "Tver"))
        .unwrap();
    customer.customer_city = "Kazan".to_string();
    customers.update_customer(&customer).unwrap();
    assert_eq!(
        customers.get_customer(customer.id).unwrap().unwrap(),
        customer
    );
}

#[test]
fn update_and_delete_missing_rows_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let devices = SqliteDeviceRepository::try_new(&conn).unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut ghost = devices.create_device(&NewDevice::new("Acme", "X1")).unwrap();
    devices.delete_device(ghost.id).unwrap();
    ghost.model = "X2".to_string();

    let err = devices.update_device(&ghost).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: RecordKind::Device, id } if id == ghost.id
    ));

    let err = customers.delete_customer(999).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: RecordKind::Customer,
            id: 999
        }
    ));
    assert!(customers.get_customer(999).unwrap().is_none());
}

#[test]
fn deleting_referenced_customer_is_restricted() {
    let conn = open_db_in_memory().unwrap();
    let devices = SqliteDeviceRepository::try_new(&conn).unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let units = SqliteDeviceInFieldRepository::try_new(&conn).unwrap();

    let device = devices.create_device(&NewDevice::new("Acme", "X1")).unwrap();
    let referenced = customers
        .create_customer(&NewCustomer::new("Foo", "Lenina 1", "Tver"))
        .unwrap();
    let unreferenced = customers
        .create_customer(&NewCustomer::new("Bar", "Mira 2", "Omsk"))
        .unwrap();
    units
        .create_device_in_field(&NewDeviceInField::new(
            "SN1",
            referenced.id,
            device.id,
            "owned",
        ))
        .unwrap();

    let err = customers.delete_customer(referenced.id).unwrap_err();
    match err {
        RepoError::ReferentialIntegrity(ReferentialIntegrityError::DeleteRestricted {
            kind,
            id,
            dependent,
            dependents,
        }) => {
            assert_eq!(kind, RecordKind::Customer);
            assert_eq!(id, referenced.id);
            assert_eq!(dependent, RecordKind::DeviceInField);
            assert_eq!(dependents, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(customers.get_customer(referenced.id).unwrap().is_some());

    customers.delete_customer(unreferenced.id).unwrap();
    assert!(customers.get_customer(unreferenced.id).unwrap().is_none());
}

#[test]
fn deleting_referenced_device_is_restricted_until_unit_is_removed() {
    let conn = open_db_in_memory().unwrap();
    let devices = SqliteDeviceRepository::try_new(&conn).unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let units = SqliteDeviceInFieldRepository::try_new(&conn).unwrap();

    let device = devices.create_device(&NewDevice::new("Acme", "X1")).unwrap();
    let customer = customers
        .create_customer(&NewCustomer::new("Foo", "Lenina 1", "Tver"))
        .unwrap();
    let unit = units
        .create_device_in_field(&NewDeviceInField::new("SN1", customer.id, device.id, "owned"))
        .unwrap();

    let err = devices.delete_device(device.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity(ReferentialIntegrityError::DeleteRestricted {
            kind: RecordKind::Device,
            dependent: RecordKind::DeviceInField,
            ..
        })
    ));

    units.delete_device_in_field(unit.id).unwrap();
    devices.delete_device(device.id).unwrap();
    customers.delete_customer(customer.id).unwrap();
}

#[test]
fn list_devices_filters_by_manufacturer_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();

    let a = repo.create_device(&NewDevice::new("Acme", "A")).unwrap();
    repo.create_device(&NewDevice::new("Other", "O")).unwrap();
    let b = repo.create_device(&NewDevice::new("Acme", "B")).unwrap();
    let c = repo.create_device(&NewDevice::new("Acme", "C")).unwrap();

    let acme = repo
        .list_devices(&DeviceListQuery {
            manufacturer: Some("Acme".to_string()),
            ..DeviceListQuery::default()
        })
        .unwrap();
    let ids: Vec<_> = acme.iter().map(|device| device.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);

    let page = repo
        .list_devices(&DeviceListQuery {
            manufacturer: Some("Acme".to_string()),
            limit: Some(1),
            offset: 1,
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, b.id);

    let tail = repo
        .list_devices(&DeviceListQuery {
            offset: 3,
            ..DeviceListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id, c.id);
}

#[test]
fn list_customers_filters_by_city() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let tver = repo
        .create_customer(&NewCustomer::new("Foo", "Lenina 1", "Tver"))
        .unwrap();
    repo.create_customer(&NewCustomer::new("Bar", "Mira 2", "Omsk"))
        .unwrap();

    let result = repo
        .list_customers(&CustomerListQuery {
            city: Some("Tver".to_string()),
            ..CustomerListQuery::default()
        })
        .unwrap();
    assert_eq!(result, vec![tver]);
}
