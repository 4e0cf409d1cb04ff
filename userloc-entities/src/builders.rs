pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::user_builder::*;

pub mod user_builder {

    use super::*;
    use crate::user::*;

    #[derive(Debug)]
    pub struct UserBuild {
        user: User,
    }

    impl UserBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.user.id = id.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.user.name = name.into();
            self
        }
        pub fn email(mut self, email: &str) -> Self {
            self.user.email = email.into();
            self
        }
        pub fn neighborhood(mut self, neighborhood: &str) -> Self {
            self.user.address.neighborhood = Some(neighborhood.into());
            self
        }
        pub fn city(mut self, city: &str) -> Self {
            self.user.address.city = Some(city.into());
            self
        }
        pub fn state(mut self, state: &str) -> Self {
            self.user.address.state = Some(state.into());
            self
        }
        pub fn role(mut self, role: Role) -> Self {
            self.user.role = role;
            self
        }
        pub fn finish(self) -> User {
            self.user
        }
    }

    impl Builder for User {
        type Build = UserBuild;
        fn build() -> UserBuild {
            UserBuild {
                user: User {
                    id: Default::default(),
                    name: Default::default(),
                    email: Default::default(),
                    address: Default::default(),
                    role: Role::User,
                },
            }
        }
    }
}
