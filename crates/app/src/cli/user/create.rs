use clap::Args;
use tienda_app::{
    auth::password::Password,
    database::{self, Db},
    domain::users::{PgUsersService, UsersService, data::NewUser, records::UserUuid},
};

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "TIENDA_USER_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Role name such as `customer`, `seller` or `admin`
    #[arg(long)]
    role: Option<String>,

    /// Also grant the admin role
    #[arg(long)]
    admin: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgUsersService::new(Db::new(pool));

    let user = service
        .create_user(NewUser {
            uuid: UserUuid::new(),
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password: Password::new(args.password),
            national_id: None,
            address: None,
            phone: None,
            region: None,
            commune: None,
            role: args.role,
            admin: args.admin,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    let roles: Vec<_> = user.roles.iter().map(|role| role.name.as_str()).collect();

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("roles: {}", roles.join(", "));

    Ok(())
}
