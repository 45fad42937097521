use farmsync_core::records::{ImageUpload, NewCrop, NewFarmType, NewFarmer, NewUser, Role};
use farmsync_core::util::normalize_text_option;
use farmsync_core::{Record, Synchronizer};

use crate::cli::{
    CropCommands, DeleteArgs, FarmTypeCommands, FarmerCommands, ListArgs, RoleArg, ShowArgs,
    UpdateArgs, UserCommands,
};
use crate::commands::common::{
    open_client, parse_assignments, parse_record_id, print_record, print_records, require_text,
    RecordSummary,
};
use crate::error::CliError;
use crate::settings::Overrides;

pub async fn run_list<R: Record + RecordSummary>(
    sync: &Synchronizer<R>,
    args: &ListArgs,
) -> Result<(), CliError> {
    let records = sync.fetch_all().await?;
    print_records(&records, args.json)
}

pub async fn run_show<R: Record + RecordSummary>(
    sync: &Synchronizer<R>,
    args: &ShowArgs,
) -> Result<(), CliError> {
    let id = parse_record_id(&args.id)?;
    let record = sync.fetch_by_id(&id).await?;
    print_record(&record, args.json)
}

pub async fn run_update<R: Record + RecordSummary>(
    sync: &Synchronizer<R>,
    args: &UpdateArgs,
) -> Result<(), CliError> {
    let id = parse_record_id(&args.id)?;
    let changes = parse_assignments(&args.assignments)?;
    let record = sync.update_partial(&id, &changes).await?;
    println!("{}", record.id());
    Ok(())
}

pub async fn run_delete<R: Record>(
    sync: &Synchronizer<R>,
    args: &DeleteArgs,
) -> Result<(), CliError> {
    let id = parse_record_id(&args.id)?;
    sync.delete_by_id(&id).await?;
    println!("{id}");
    Ok(())
}

fn print_created<R: Record>(record: &R) {
    if record.id().is_local() {
        println!("{} (saved offline)", record.id());
    } else {
        println!("{}", record.id());
    }
}

pub async fn run_farm_types(
    command: FarmTypeCommands,
    overrides: &Overrides,
) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    let sync = client.farm_types();
    match command {
        FarmTypeCommands::List(args) => run_list(sync, &args).await,
        FarmTypeCommands::Show(args) => run_show(sync, &args).await,
        FarmTypeCommands::Add { name, description } => {
            let draft = NewFarmType {
                name: require_text(&name, "Farm type name")?,
                description: description.trim().to_string(),
            };
            print_created(&sync.create(draft).await?);
            Ok(())
        }
        FarmTypeCommands::Update(args) => run_update(sync, &args).await,
        FarmTypeCommands::Delete(args) => run_delete(sync, &args).await,
    }
}

pub async fn run_crops(command: CropCommands, overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    let sync = client.crops();
    match command {
        CropCommands::List(args) => run_list(sync, &args).await,
        CropCommands::Show(args) => run_show(sync, &args).await,
        CropCommands::Add {
            name,
            crop_type,
            description,
            image,
        } => {
            let draft = NewCrop {
                name: require_text(&name, "Crop name")?,
                crop_type: normalize_text_option(crop_type),
                description: description.trim().to_string(),
            };
            let crop = match image {
                Some(path) => {
                    let upload = ImageUpload::from_path(&path).await?;
                    sync.create_with_image(draft, upload).await?
                }
                None => sync.create(draft).await?,
            };
            print_created(&crop);
            Ok(())
        }
        CropCommands::Update(args) => run_update(sync, &args).await,
        CropCommands::Delete(args) => run_delete(sync, &args).await,
    }
}

pub async fn run_farmers(command: FarmerCommands, overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    let sync = client.farmers();
    match command {
        FarmerCommands::List(args) => run_list(sync, &args).await,
        FarmerCommands::Show(args) => run_show(sync, &args).await,
        FarmerCommands::Add {
            name,
            national_id,
            location,
            farm_type,
            crop,
        } => {
            let draft = NewFarmer {
                name: require_text(&name, "Farmer name")?,
                national_id: require_text(&national_id, "National id")?,
                location: location.trim().to_string(),
                farm_type: parse_record_id(&farm_type)?,
                crop: parse_record_id(&crop)?,
            };
            print_created(&sync.create(draft).await?);
            Ok(())
        }
        FarmerCommands::Update(args) => run_update(sync, &args).await,
        FarmerCommands::Delete(args) => run_delete(sync, &args).await,
    }
}

pub async fn run_users(command: UserCommands, overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    let sync = client.users();
    match command {
        UserCommands::List(args) => run_list(sync, &args).await,
        UserCommands::Show(args) => run_show(sync, &args).await,
        UserCommands::Add {
            username,
            first_name,
            last_name,
            email,
            phone,
            role,
            password,
        } => {
            let draft = NewUser {
                username: require_text(&username, "Username")?,
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                email: email.trim().to_string(),
                phone: normalize_text_option(phone),
                role: role_from_arg(role),
                password: password.filter(|password| !password.is_empty()),
            };
            print_created(&sync.create(draft).await?);
            Ok(())
        }
        UserCommands::Update(args) => run_update(sync, &args).await,
        UserCommands::Delete(args) => run_delete(sync, &args).await,
    }
}

pub const fn role_from_arg(role: RoleArg) -> Role {
    match role {
        RoleArg::Clerk => Role::Clerk,
        RoleArg::Admin => Role::Admin,
    }
}
