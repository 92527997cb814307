//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `users` - Registered users (key: user_id)
//! - `statements` - Append-only statement log (key: statement_id)
//! - `indices` - Per-user ordering index (key: user_id || created_at || statement_id)
//! - `email_index` - Email uniqueness index (key: email, value: user_id)

use crate::{
    config::Config,
    error::{Error, Result},
    store::{StatementIter, StatementStore, UserDirectory},
    types::{NewUser, Statement, StatementId, User, UserId},
};
use parking_lot::Mutex;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB,
};

/// Column family names
const CF_USERS: &str = "users";
const CF_STATEMENTS: &str = "statements";
const CF_INDICES: &str = "indices";
const CF_EMAIL_INDEX: &str = "email_index";

/// Statement ordering index key: user_id (16) || created_at nanos BE (8) || statement_id (16)
const INDEX_KEY_LEN: usize = 40;

/// Storage wrapper for RocksDB
///
/// Implements both collaborator contracts: [`UserDirectory`] and
/// [`StatementStore`].
pub struct Storage {
    db: DB,

    /// Serializes email check-then-insert during registration
    registration: Mutex<()>,
}

impl Storage {
    /// Open or create the database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_USERS, Self::cf_options_users()),
            ColumnFamilyDescriptor::new(CF_STATEMENTS, Self::cf_options_statements()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_indices()),
            ColumnFamilyDescriptor::new(CF_EMAIL_INDEX, Self::cf_options_indices()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self {
            db,
            registration: Mutex::new(()),
        })
    }

    // Column family options

    fn cf_options_statements() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_options_users() -> Options {
        let mut opts = Options::default();
        // Users are frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_indices() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    // Helper: get column family handle

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    /// Stage a statement plus its ordering index entry into a batch
    fn stage_statement(&self, batch: &mut WriteBatch, statement: &Statement) -> Result<()> {
        let cf_statements = self.cf(CF_STATEMENTS)?;
        let value = bincode::serialize(statement)?;
        batch.put_cf(cf_statements, statement.id.as_bytes(), &value);

        let cf_indices = self.cf(CF_INDICES)?;
        batch.put_cf(cf_indices, Self::index_key(statement), b"");

        Ok(())
    }

    fn index_key(statement: &Statement) -> [u8; INDEX_KEY_LEN] {
        let mut key = [0u8; INDEX_KEY_LEN];
        key[..16].copy_from_slice(statement.user_id.as_bytes());
        let nanos = statement.created_at.timestamp_nanos_opt().unwrap_or(0);
        key[16..24].copy_from_slice(&nanos.to_be_bytes());
        key[24..].copy_from_slice(statement.id.as_bytes());
        key
    }
}

impl StatementStore for Storage {
    fn append(&self, statement: &Statement) -> Result<StatementId> {
        let mut batch = WriteBatch::default();
        self.stage_statement(&mut batch, statement)?;
        self.db.write(batch)?;

        tracing::debug!(
            statement_id = %statement.id,
            user_id = %statement.user_id,
            operation = %statement.operation,
            "Statement appended"
        );

        Ok(statement.id)
    }

    fn append_pair(&self, debit: &Statement, credit: &Statement) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.stage_statement(&mut batch, debit)?;
        self.stage_statement(&mut batch, credit)?;
        // Atomic commit: both legs become visible together or not at all
        self.db.write(batch)?;

        tracing::debug!(
            debit_id = %debit.id,
            credit_id = %credit.id,
            "Transfer pair appended"
        );

        Ok(())
    }

    fn get_by_id(&self, id: StatementId) -> Result<Option<Statement>> {
        let cf = self.cf(CF_STATEMENTS)?;

        match self.db.get_cf(cf, id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    fn list_by_user(&self, user_id: UserId) -> Result<StatementIter<'_>> {
        let cf = self.cf(CF_INDICES)?;
        let prefix = *user_id.as_bytes();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix.as_slice(), Direction::Forward))
            .take_while(move |item| match item {
                Ok((key, _)) => key.starts_with(&prefix),
                Err(_) => true,
            })
            .map(move |item| {
                let (key, _) = item.map_err(Error::from)?;
                let id_bytes: [u8; 16] = key
                    .get(24..INDEX_KEY_LEN)
                    .and_then(|slice| slice.try_into().ok())
                    .ok_or_else(|| Error::Storage("Malformed statement index key".to_string()))?;
                let id = StatementId::from_bytes(id_bytes);

                self.get_by_id(id)?
                    .ok_or_else(|| Error::Storage(format!("Index entry without statement: {}", id)))
            });

        Ok(Box::new(iter))
    }
}

impl UserDirectory for Storage {
    fn create_user(&self, new_user: NewUser) -> Result<User> {
        // Serialize check-then-insert so two registrations cannot share an email
        let _guard = self.registration.lock();

        if self.find_by_email(&new_user.email)?.is_some() {
            return Err(Error::EmailTaken(new_user.email));
        }

        let user = User::from_new(new_user);
        let value = bincode::serialize(&user)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_USERS)?, user.id.as_bytes(), &value);
        batch.put_cf(
            self.cf(CF_EMAIL_INDEX)?,
            user.email.as_bytes(),
            user.id.as_bytes(),
        );
        self.db.write(batch)?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let cf = self.cf(CF_USERS)?;

        match self.db.get_cf(cf, id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let cf = self.cf(CF_EMAIL_INDEX)?;

        let id_bytes = match self.db.get_cf(cf, email.as_bytes())? {
            Some(value) => value,
            None => return Ok(None),
        };

        let id_bytes: [u8; 16] = id_bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::Storage("Malformed email index value".to_string()))?;

        self.find_by_id(UserId::from_uuid(uuid::Uuid::from_bytes(id_bytes)))
    }
}
