//! Derive macros for rinject
//!
//! `#[derive(Injectable)]` turns the fields marked with `#[inject]` into the
//! member list an injector walks, so no runtime type introspection is needed.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, GenericParam,
    Member, PathArguments, Type, TypeParam, TypePath,
};

/// Generates an `Injectable` implementation from `#[inject]` field attributes.
///
/// Supported keys, comma separated: `optional`, `required`, `read_only`.
///
/// Without `optional` or `required`, only `Option<_>` fields are optional.
/// Every other field is required, `Arc<S>` included.
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// How the resolved service reaches the field.
enum Slot {
    /// `Arc<S>`: the registry instance itself, keyed by `S`.
    Shared(Type),
    /// Any other type: a clone of the stored value, keyed by the type.
    Cloned(Type),
}

struct Plan {
    member: Member,
    name: String,
    slot: Slot,
    wrapped: bool,
    required: bool,
    read_only: bool,
}

#[derive(Default)]
struct InjectArgs {
    optional: bool,
    required: bool,
    read_only: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Injectable can only be derived for structs",
            ))
        }
    };

    let plans = plan_fields(fields)?;

    // Injectable requires 'static
    let mut generics = input.generics.clone();
    let type_params: Vec<_> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(TypeParam { ident, .. }) => Some(ident.clone()),
            _ => None,
        })
        .collect();
    let where_clause = generics.make_where_clause();
    for ident in type_params {
        where_clause.predicates.push(syn::parse_quote!(#ident: 'static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let members = plans.iter().map(member_tokens);
    let backing = plans
        .iter()
        .filter(|plan| plan.read_only)
        .map(|plan| {
            let name = &plan.name;
            let assign = assign_tokens(plan);
            quote! { #name => ::core::result::Result::Ok(#assign), }
        });

    Ok(quote! {
        impl #impl_generics ::rinject::Injectable for #name #ty_generics #where_clause {
            fn injectable_members(&self) -> ::std::vec::Vec<::rinject::Member<Self>> {
                ::std::vec![#(#members),*]
            }

            fn backing_storage(
                &self,
                member: &::rinject::Member<Self>,
            ) -> ::core::result::Result<::rinject::Assign<Self>, ::rinject::AssignError> {
                match member.name() {
                    #(#backing)*
                    _ => ::core::result::Result::Err(::rinject::AssignError::NoBackingStorage {
                        member: member.name(),
                    }),
                }
            }
        }
    })
}

fn plan_fields(fields: &Fields) -> syn::Result<Vec<Plan>> {
    let mut plans = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let Some(args) = inject_args(&field.attrs)? else {
            continue;
        };
        if args.optional && args.required {
            return Err(syn::Error::new_spanned(
                field,
                "`optional` and `required` cannot be combined",
            ));
        }

        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        };
        let name = match &field.ident {
            Some(ident) => ident.to_string(),
            None => index.to_string(),
        };

        let (inner, wrapped) = match single_argument(&field.ty, "Option") {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };
        let slot = match single_argument(inner, "Arc") {
            Some(service) if !matches!(service, Type::TraitObject(_)) => {
                Slot::Shared(service.clone())
            }
            _ => Slot::Cloned(inner.clone()),
        };

        let required = if args.optional || args.required {
            args.required
        } else {
            !wrapped
        };

        plans.push(Plan {
            member,
            name,
            slot,
            wrapped,
            required,
            read_only: args.read_only,
        });
    }
    Ok(plans)
}

/// Parses `#[inject]` / `#[inject(...)]`; `None` when the field is not marked.
fn inject_args(attrs: &[Attribute]) -> syn::Result<Option<InjectArgs>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    let mut args = InjectArgs::default();
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(Some(args));
    }
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("optional") {
            args.optional = true;
        } else if meta.path.is_ident("required") {
            args.required = true;
        } else if meta.path.is_ident("read_only") {
            args.read_only = true;
        } else {
            return Err(meta.error("expected `optional`, `required` or `read_only`"));
        }
        Ok(())
    })?;
    Ok(Some(args))
}

/// `Wrapper<X>` -> `X`, matched on the last path segment.
fn single_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let segment = path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn service_type(plan: &Plan) -> &Type {
    match &plan.slot {
        Slot::Shared(ty) | Slot::Cloned(ty) => ty,
    }
}

fn setter_body(plan: &Plan) -> TokenStream2 {
    let member = &plan.member;
    if plan.wrapped {
        quote! { target.#member = ::core::option::Option::Some(value); }
    } else {
        quote! { target.#member = value; }
    }
}

fn assign_tokens(plan: &Plan) -> TokenStream2 {
    let ty = service_type(plan);
    let body = setter_body(plan);
    match plan.slot {
        Slot::Shared(_) => quote! {
            ::rinject::Assign::shared::<#ty, _>(|target: &mut Self, value| { #body })
        },
        Slot::Cloned(_) => quote! {
            ::rinject::Assign::cloned::<#ty, _>(|target: &mut Self, value| { #body })
        },
    }
}

fn member_tokens(plan: &Plan) -> TokenStream2 {
    let name = &plan.name;
    let ty = service_type(plan).to_token_stream();
    let required = plan.required;

    let member = if plan.read_only {
        quote! { ::rinject::Member::read_only::<#ty>(#name) }
    } else {
        let body = setter_body(plan);
        match plan.slot {
            Slot::Shared(_) => quote! {
                ::rinject::Member::shared::<#ty, _>(#name, |target: &mut Self, value| { #body })
            },
            Slot::Cloned(_) => quote! {
                ::rinject::Member::cloned::<#ty, _>(#name, |target: &mut Self, value| { #body })
            },
        }
    };
    quote! { #member.with_required(#required) }
}
